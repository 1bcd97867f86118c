//! nyane.online availability check (grounded on `finder.py`'s `NyaneOnline`).

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct NyaneOnline;

#[async_trait]
impl Probe for NyaneOnline {
    fn classname(&self) -> &'static str {
        "NyaneOnline"
    }
    fn config_key(&self) -> &'static str {
        "nyaneonline"
    }
    fn display_name(&self) -> &'static str {
        "nyane.online"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let url = "https://www.nyane.online/video";
        let resp = ctx.http.head(url).query(&[("id", id.as_str())]).send().await?;
        let code = resp.status().as_u16();
        let effective_url = resp.url().to_string();

        let archived = match code {
            200 => {
                links.emit(Link::new(
                    effective_url,
                    LinkContains {
                        video: true,
                        metadata: true,
                        thumbnail: true,
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
