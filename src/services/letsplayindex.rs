//! letsplayindex.com redirect probe (grounded on `finder.py`'s
//! `LetsPlayIndex`). Relies on the shared client's no-redirect policy
//! (`http.rs`) to observe the 301 before it gets followed.

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct LetsPlayIndex;

#[async_trait]
impl Probe for LetsPlayIndex {
    fn classname(&self) -> &'static str {
        "LetsPlayIndex"
    }
    fn config_key(&self) -> &'static str {
        "letsplayindex"
    }
    fn display_name(&self) -> &'static str {
        "Let's Play Index"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let url = format!("https://www.letsplayindex.com/video/x-{id}");

        let resp = match ctx.http.head(&url).send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                return Ok(ProbeResult {
                    archived: false,
                    lastupdated: now_secs(),
                    name: self.display_name().to_string(),
                    note: "The Let's Play Index timed out.".to_string(),
                    rawraw: None,
                    metaonly: false,
                    comments: false,
                    available: Vec::new(),
                    error: None,
                    maybe_paywalled: false,
                    classname: self.classname().to_string(),
                });
            }
            Err(err) => return Err(ProbeError::from(err)),
        };

        let code = resp.status().as_u16();
        let archived = match code {
            301 => {
                links.emit(Link::new(
                    url.clone(),
                    LinkContains {
                        metadata: true,
                        thumbnail: true,
                        ..LinkContains::none()
                    },
                    "Video",
                ));
                true
            }
            other => return Err(ProbeError::UnexpectedStatus(other)),
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(serde_json::json!({"status_code": code})),
            metaonly: false,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
