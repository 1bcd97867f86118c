//! Filmot metadata/captions index lookup (grounded on `finder.py`'s
//! `Filmot`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct Filmot;

/// Minimum spacing between requests to this probe's upstream (§4.5).
const COOLDOWN_SECS: f64 = 2.0;

#[async_trait]
impl Probe for Filmot {
    fn classname(&self) -> &'static str {
        "Filmot"
    }
    fn config_key(&self) -> &'static str {
        "filmot"
    }
    fn display_name(&self) -> &'static str {
        "Filmot"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        ctx.wait_cooldown(self.classname(), COOLDOWN_SECS).await;

        let key = ctx.service.api_key().unwrap_or_default();
        let metadata: Value = ctx
            .http
            .get("https://filmot.com/api/getvideos")
            .query(&[("key", key), ("id", id.as_str()), ("flags", "1")])
            .send()
            .await?
            .json()
            .await?;

        let archived = metadata.as_array().is_some_and(|a| !a.is_empty());
        if archived {
            links.emit(Link::new(
                format!("https://filmot.com/video/{id}"),
                LinkContains {
                    metadata: true,
                    captions: true,
                    ..LinkContains::none()
                },
                "Metadata",
            ));
        }

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(metadata),
            metaonly: true,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
