//! PreserveTube metadata lookup (grounded on `finder.py`'s `PreserveTube`).

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct PreserveTube;

#[async_trait]
impl Probe for PreserveTube {
    fn classname(&self) -> &'static str {
        "PreserveTube"
    }
    fn config_key(&self) -> &'static str {
        "preservetube"
    }
    fn display_name(&self) -> &'static str {
        "PreserveTube"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let url = format!("https://api.preservetube.com/video/{id}");
        let body: serde_json::Value = ctx
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .json()
            .await?;

        let archived = match body.get("error").and_then(|v| v.as_str()) {
            Some("404") => false,
            Some(_other) => {
                return Err(ProbeError::contract("preservetube returned an unexpected error field"));
            }
            None => {
                if body.get("title").is_none() {
                    return Err(ProbeError::contract(
                        "preservetube response missing expected 'title' field",
                    ));
                }
                links.emit(Link::new(
                    format!("https://preservetube.com/watch?v={id}"),
                    LinkContains {
                        video: true,
                        thumbnail: true,
                        metadata: true,
                        ..LinkContains::none()
                    },
                    "Video",
                ));
                true
            }
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
