//! Distributed YouTube Archive (a Discord-community-run mirror network)
//! (grounded on `finder.py`'s `DistributedYoutubeArchive`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct DistributedYoutubeArchive;

const JOIN_NOTE: &str = "One or more contributors to the Distributed YouTube Archive have the \
video. Join their Discord server to request retrieval.";

#[async_trait]
impl Probe for DistributedYoutubeArchive {
    fn classname(&self) -> &'static str {
        "DistributedYoutubeArchive"
    }
    fn config_key(&self) -> &'static str {
        "distributed_youtube_archive"
    }
    fn display_name(&self) -> &'static str {
        "Distributed YouTube Archive"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let resp = ctx
            .http
            .get(format!("https://dya-t-api.strangled.net/api/video/{id}"))
            .send()
            .await?;
        let status = resp.status().as_u16();
        if status != 200 && status != 404 {
            return Err(ProbeError::UnexpectedStatus(status));
        }
        let mut body: Value = resp.json().await?;

        let archived = match body.get("contributions") {
            None => {
                if body.get("error").is_none() {
                    return Err(ProbeError::contract(
                        "no 'error' or 'contributions' field returned",
                    ));
                }
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("contributions_length".into(), Value::Null);
                }
                false
            }
            Some(Value::Array(contributions)) => {
                let len = contributions.len();
                let archived = len > 0;
                if archived {
                    links.emit(Link::new(
                        "https://discord.gg/ZvzyRWTujK",
                        LinkContains::all(),
                        "Discord invite",
                    ));
                }
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("contributions_length".into(), serde_json::json!(len));
                    obj.remove("contributions");
                }
                archived
            }
            Some(_) => {
                return Err(ProbeError::contract(
                    "'contributions' field was not an array",
                ));
            }
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: if archived { JOIN_NOTE.to_string() } else { String::new() },
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
