//! removededm.com, a MediaWiki instance mirroring videos removed for
//! copyright/legal reasons (grounded on `finder.py`'s `removededm`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct RemovedEdm;

const ENDPOINT: &str = "https://removededm.com/w/api.php";

struct FileGroup {
    titles: Vec<String>,
    contains: LinkContains,
    title: &'static str,
    note: Option<&'static str>,
}

fn potential_files(id: &VideoId) -> [FileGroup; 4] {
    [
        FileGroup {
            titles: vec![id.as_str().to_string()],
            contains: LinkContains {
                metadata: true,
                ..LinkContains::none()
            },
            title: "Metadata",
            note: None,
        },
        FileGroup {
            titles: vec![format!("File:{id}.mp4"), format!("File:{id}.webm")],
            contains: LinkContains {
                video: true,
                ..LinkContains::none()
            },
            title: "Video",
            note: None,
        },
        FileGroup {
            titles: ["jpg", "png", "webp"]
                .iter()
                .map(|ext| format!("File:{id}.{ext}"))
                .collect(),
            contains: LinkContains {
                thumbnail: true,
                ..LinkContains::none()
            },
            title: "Thumbnail",
            note: None,
        },
        FileGroup {
            titles: ["jpg", "png", "webp"]
                .iter()
                .map(|ext| format!("File:{id}_.{ext}"))
                .collect(),
            contains: LinkContains {
                single_frame: true,
                ..LinkContains::none()
            },
            title: "Frame",
            note: Some("This is a single frame of the video."),
        },
    ]
}

async fn query_pages(ctx: &ProbeContext, titles: &str) -> Result<Value, ProbeError> {
    ctx.http
        .get(ENDPOINT)
        .query(&[
            ("action", "query"),
            ("format", "json"),
            ("titles", titles),
            ("formatversion", "2"),
        ])
        .send()
        .await?
        .json()
        .await
        .map_err(ProbeError::from)
}

/// Single-flight login against the MediaWiki session (§4.4, §5e).
async fn login(ctx: &ProbeContext) -> Result<(), ProbeError> {
    let lock = ctx.login_locks.lock_for("RemovedEdm");
    let _guard = lock.lock().await;

    let username = ctx.service.username().unwrap_or_default();
    let password = ctx.service.password().unwrap_or_default();

    let token_resp: Value = ctx
        .http
        .get(ENDPOINT)
        .query(&[
            ("action", "query"),
            ("format", "json"),
            ("meta", "tokens"),
            ("type", "login"),
            ("formatversion", "2"),
        ])
        .send()
        .await?
        .json()
        .await?;
    let token = token_resp
        .get("query")
        .and_then(|q| q.get("tokens"))
        .and_then(|t| t.get("logintoken"))
        .and_then(Value::as_str)
        .ok_or_else(|| ProbeError::contract("login token response missing logintoken"))?;

    let login_resp: Value = ctx
        .http
        .post(ENDPOINT)
        .form(&[
            ("action", "login"),
            ("format", "json"),
            ("formatversion", "2"),
            ("lgname", username),
            ("lgpassword", password),
            ("lgtoken", token),
        ])
        .send()
        .await?
        .json()
        .await?;
    let result = login_resp
        .get("login")
        .and_then(|l| l.get("result"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if result != "Success" {
        return Err(ProbeError::LoginFailed(format!(
            "MediaWiki login result was '{result}'"
        )));
    }
    Ok(())
}

#[async_trait]
impl Probe for RemovedEdm {
    fn classname(&self) -> &'static str {
        "RemovedEdm"
    }
    fn config_key(&self) -> &'static str {
        "removededm"
    }
    fn display_name(&self) -> &'static str {
        "removededm"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let groups = potential_files(id);
        let titles = groups
            .iter()
            .flat_map(|g| g.titles.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join("|");

        let mut response = query_pages(ctx, &titles).await?;
        if let Some(code) = response
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
        {
            if code == "readapidenied" {
                login(ctx).await?;
                response = query_pages(ctx, &titles).await?;
            }
        }
        if response.get("error").is_some() {
            return Err(ProbeError::contract("MediaWiki API returned an error"));
        }

        let pages = response
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut present: std::collections::HashSet<String> = pages
            .iter()
            .filter(|p| p.get("missing").is_none())
            .filter_map(|p| p.get("title").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        // MediaWiki normalizes titles with underscores; keep both forms.
        if let Some(normalized) = response
            .get("query")
            .and_then(|q| q.get("normalized"))
            .and_then(Value::as_array)
        {
            for entry in normalized {
                let to = entry.get("to").and_then(Value::as_str).unwrap_or_default();
                let from = entry.get("from").and_then(Value::as_str).unwrap_or_default();
                if present.contains(to) {
                    present.insert(from.to_string());
                }
            }
        }

        let mut archived = false;
        let mut got_video = false;
        for group in &groups {
            if group.contains.video {
                got_video = true;
            }
            for title in &group.titles {
                if present.contains(title) {
                    archived = true;
                    let mut link = Link::new(
                        format!("https://removededm.com/{title}"),
                        group.contains,
                        group.title,
                    );
                    if let Some(note) = group.note {
                        link = link.with_note(note);
                    }
                    links.emit(link);
                }
            }
        }

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: None,
            metaonly: !got_video,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}
