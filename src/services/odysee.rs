//! Odysee/LBRY resolve lookup (grounded on `finder.py`'s `Odysee`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct Odysee;

#[async_trait]
impl Probe for Odysee {
    fn classname(&self) -> &'static str {
        "Odysee"
    }
    fn config_key(&self) -> &'static str {
        "odysee"
    }
    fn display_name(&self) -> &'static str {
        "Odysee"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let body: Value = ctx
            .http
            .get(format!("https://api.lbry.com/yt/resolve?video_ids={id}"))
            .send()
            .await?
            .json()
            .await?;

        let odysee_id = body
            .get("data")
            .and_then(|d| d.get("videos"))
            .and_then(|v| v.get(id.as_str()))
            .ok_or_else(|| ProbeError::contract("resolve response missing data.videos.<id>"))?;

        let archived = !odysee_id.is_null();
        if let Some(odysee_id) = odysee_id.as_str() {
            let odysee_link_id = odysee_id.replace('#', ":");
            links.emit(Link::new(
                format!("https://odysee.com/{odysee_link_id}"),
                LinkContains {
                    video: true,
                    metadata: true,
                    ..LinkContains::none()
                },
                "Video",
            ));
        }

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(body),
            metaonly: false,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
