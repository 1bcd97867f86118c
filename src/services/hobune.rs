//! hobune.stream video + comments availability check
//! (grounded on `finder.py`'s `Hobune`).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct Hobune;

/// Minimum spacing between requests to this probe's upstream (§4.5).
const COOLDOWN_SECS: f64 = 0.5;

#[async_trait]
impl Probe for Hobune {
    fn classname(&self) -> &'static str {
        "Hobune"
    }
    fn config_key(&self) -> &'static str {
        "hobune_stream"
    }
    fn display_name(&self) -> &'static str {
        "hobune.stream"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        ctx.wait_cooldown(self.classname(), COOLDOWN_SECS).await;

        let url_templates = [
            "https://hobune.stream/videos/{}",
            "https://hobune.stream/tpa-h/videos/{}",
        ];
        let mut archived = false;
        let mut comments = false;
        let mut codes = Vec::new();

        for template in url_templates {
            let url = template.replace("{}", id.as_str());
            let resp = ctx
                .http
                .head(&url)
                .timeout(Duration::from_secs(5))
                .send()
                .await?;
            let code = resp.status().as_u16();
            codes.push(code);

            match code {
                200 => {
                    archived = true;
                    links.emit(Link::new(
                        url.clone(),
                        LinkContains {
                            video: true,
                            metadata: true,
                            thumbnail: true,
                            ..LinkContains::none()
                        },
                        "Video",
                    ));

                    let comments_url = url.replace("/videos/", "/comments/");
                    let comments_resp = ctx
                        .http
                        .head(&comments_url)
                        .timeout(Duration::from_secs(5))
                        .send()
                        .await?;
                    if comments_resp.status().as_u16() == 200 {
                        comments = true;
                        links.emit(Link::new(
                            comments_url,
                            LinkContains {
                                comments: true,
                                ..LinkContains::none()
                            },
                            "Comments",
                        ));
                    }
                }
                404 => {}
                other => return Err(ProbeError::UnexpectedStatus(other)),
            }
        }

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(serde_json::json!(codes)),
            metaonly: false,
            comments,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
