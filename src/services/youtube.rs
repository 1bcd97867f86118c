//! Live-YouTube availability check via the video's `hqdefault` thumbnail
//! (grounded on `finder.py`'s `YouTube` class).

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct YouTube;

#[async_trait]
impl Probe for YouTube {
    fn classname(&self) -> &'static str {
        "YouTube"
    }
    fn config_key(&self) -> &'static str {
        "youtube"
    }
    fn display_name(&self) -> &'static str {
        "YouTube"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let thumb = format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg");
        let resp = ctx
            .http
            .head(&thumb)
            .timeout(std::time::Duration::from_secs(15))
            .send()
            .await?;
        let code = resp.status().as_u16();

        let archived = code == 200;
        if archived {
            links.emit(Link::new(
                format!("https://youtu.be/{id}"),
                LinkContains::all(),
                "Watch page",
            ));
            links.emit(Link::new(
                thumb,
                LinkContains {
                    thumbnail: true,
                    ..LinkContains::none()
                },
                "Thumbnail",
            ));
        }

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
