//! altCensored video-page check (grounded on `finder.py`'s `AltCensored`).
//! altCensored doesn't host video itself; a 200 just means it links out to
//! an archived copy elsewhere.

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct AltCensored;

#[async_trait]
impl Probe for AltCensored {
    fn classname(&self) -> &'static str {
        "AltCensored"
    }
    fn config_key(&self) -> &'static str {
        "altcensored"
    }
    fn display_name(&self) -> &'static str {
        "altCensored"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let url = format!("https://altcensored.com/watch?v={id}");
        let resp = ctx.http.get(&url).send().await?;
        let code = resp.status().as_u16();

        let archived = match code {
            200 => {
                links.emit(Link::new(
                    url,
                    LinkContains {
                        video: true,
                        metadata: true,
                        ..LinkContains::none()
                    },
                    "Video",
                ));
                true
            }
            404 => false,
            other => return Err(ProbeError::UnexpectedStatus(other)),
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: None,
            metaonly: false,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
