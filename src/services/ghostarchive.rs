//! Ghostarchive.org video-capture lookup (grounded on `finder.py`'s
//! `GhostArchive` class).

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct GhostArchive;

#[async_trait]
impl Probe for GhostArchive {
    fn classname(&self) -> &'static str {
        "GhostArchive"
    }
    fn config_key(&self) -> &'static str {
        "ghostarchive"
    }
    fn display_name(&self) -> &'static str {
        "GhostArchive"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let url = format!("https://ghostarchive.org/varchive/{id}");
        let resp = ctx
            .http
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?;
        let code = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();

        let archived = match code {
            200 => {
                if !body.contains("Visit the main page") {
                    return Err(ProbeError::contract(
                        "ghostarchive 200 response missing expected marker text",
                    ));
                }
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
            404 | 500 => false,
            other => return Err(ProbeError::UnexpectedStatus(other)),
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(serde_json::json!(code)),
            metaonly: false,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
