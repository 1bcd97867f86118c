//! Wayback Machine videoinfo → fakeurl → CDX → availability cascade
//! (grounded on `finder.py`'s `WaybackMachine`).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct WaybackMachine;

/// URL forms tried in order for both the CDX search and the Availability API
/// fallback (§4.4).
fn url_forms(id: &VideoId) -> [String; 4] {
    [
        format!("youtube.com/watch?v={id}"),
        format!("youtube.com/embed/{id}"),
        format!("youtube.com/shorts/{id}"),
        format!("youtu.be/{id}"),
    ]
}

fn formats_present(value: &Value) -> bool {
    match value {
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

fn collect_format_items(formats: &Value) -> Vec<&Value> {
    if let Some(obj) = formats.as_object() {
        let mut out = Vec::new();
        if let Some(video) = obj.get("video").and_then(Value::as_array) {
            out.extend(video.iter());
        }
        if let Some(audio) = obj.get("audio").and_then(Value::as_array) {
            out.extend(audio.iter());
        }
        out
    } else if let Some(arr) = formats.as_array() {
        arr.iter().collect()
    } else {
        Vec::new()
    }
}

/// Translates one videoinfo format entry into a [`Link`], including the
/// "Unknwn" codec typo handling from the original implementation (§4.4).
fn format_to_link(format: &Value) -> Link {
    let url = format.get("url").and_then(Value::as_str).unwrap_or_default();
    let ts = format
        .get("timestamp")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let link_url = format!("https://web.archive.org/web/{ts}/{url}");
    let mimetype = format
        .get("mimetype")
        .and_then(Value::as_str)
        .unwrap_or("application/octet-stream");
    let (m_type, m_format) = mimetype.split_once('/').unwrap_or((mimetype, ""));

    let (mut title, mut contains) = match m_type {
        "video" => (
            format!("Video ({m_format})"),
            LinkContains {
                video: true,
                standalone_video: true,
                ..LinkContains::none()
            },
        ),
        "audio" => (
            format!("Audio ({m_format})"),
            LinkContains {
                standalone_audio: true,
                ..LinkContains::none()
            },
        ),
        _ => (
            mimetype.to_string(),
            LinkContains {
                video: true,
                standalone_video: true,
                standalone_audio: true,
                ..LinkContains::none()
            },
        ),
    };

    let mut note = None;
    if let Some(codec) = format.get("codec").and_then(Value::as_str) {
        if let Some((video, audio)) = codec.split_once(", ") {
            let (video, audio) = if video == "Unknwn" {
                contains = LinkContains {
                    standalone_audio: true,
                    ..LinkContains::none()
                };
                ("No".to_string(), audio.to_string())
            } else if audio == "Unknwn" {
                contains = LinkContains {
                    standalone_video: true,
                    ..LinkContains::none()
                };
                (video.to_string(), "no".to_string())
            } else {
                (video.to_string(), audio.to_string())
            };
            let itag = format
                .get("itag")
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            note = Some(format!("{video} video, {audio} audio ({itag})"));
        }
    }
    let _ = &mut title;
    let mut link = Link::new(link_url, contains, title);
    if let Some(note) = note {
        link = link.with_note(note);
    }
    link
}

#[async_trait]
impl Probe for WaybackMachine {
    fn classname(&self) -> &'static str {
        "WaybackMachine"
    }
    fn config_key(&self) -> &'static str {
        "ia_wayback"
    }
    fn display_name(&self) -> &'static str {
        "Wayback Machine"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let mut archived = false;
        let mut metaonly = false;

        let videoinfo: Value = ctx
            .http
            .get("https://web.archive.org/__wb/videoinfo")
            .query(&[("vtype", "youtube"), ("vid", id.as_str())])
            .timeout(Duration::from_secs(5))
            .send()
            .await?
            .json()
            .await?;

        let formats = videoinfo.get("formats");
        let videoinfo_archived = formats.map(formats_present).unwrap_or(false);
        if videoinfo_archived {
            archived = true;
            for format in collect_format_items(formats.unwrap()) {
                links.emit(format_to_link(format));
            }
        }

        if !archived {
            let fake_url = format!(
                "https://web.archive.org/web/0id_/http://wayback-fakeurl.archive.org/yt/{id}"
            );
            let resp = ctx
                .http
                .head(&fake_url)
                .timeout(Duration::from_secs(15))
                .send()
                .await?;
            if let Some(location) = resp.headers().get(reqwest::header::LOCATION) {
                let location = location.to_str().unwrap_or_default();
                if location == "/sry" {
                    return Err(ProbeError::contract(
                        "fakeurl redirected to the sorry page; is IA down?",
                    ));
                }
                archived = true;
                links.emit(
                    Link::new(
                        fake_url,
                        LinkContains {
                            video: true,
                            standalone_video: true,
                            ..LinkContains::none()
                        },
                        "Video",
                    )
                    .with_note("A backup endpoint was used. More formats may be available later."),
                );
                crate::experiment::submit(
                    ctx,
                    "wb-vi-failures",
                    id,
                    serde_json::json!({"fakeurl": true, "videoinfo": videoinfo_archived}),
                )
                .await;
            }
        }

        if !archived {
            for check in url_forms(id) {
                let resp = ctx
                    .http
                    .get("https://web.archive.org/cdx/search/cdx")
                    .query(&[
                        ("url", check.as_str()),
                        ("collapse", "urlkey"),
                        ("filter", "statuscode:200"),
                        ("output", "json"),
                    ])
                    .timeout(Duration::from_secs(15))
                    .send()
                    .await;
                let Ok(resp) = resp else { continue };
                let Ok(cdx_results) = resp.json::<Value>().await else {
                    continue;
                };
                if let Some(rows) = cdx_results.as_array() {
                    if rows.len() >= 2 {
                        let timestamp = rows[1].get(1).and_then(Value::as_str).unwrap_or_default();
                        let original = rows[1].get(2).and_then(Value::as_str).unwrap_or_default();
                        links.emit(Link::new(
                            format!("https://web.archive.org/web/{timestamp}/{original}"),
                            LinkContains {
                                metadata: true,
                                ..LinkContains::none()
                            },
                            "Watch page (may not work)",
                        ));
                        metaonly = true;
                        archived = true;
                        break;
                    }
                }
            }
        }

        if !archived {
            for check in url_forms(id) {
                let resp: Value = ctx
                    .http
                    .get("https://archive.org/wayback/available")
                    .query(&[("url", check.as_str()), ("timestamp", "0")])
                    .timeout(Duration::from_secs(15))
                    .send()
                    .await?
                    .json()
                    .await?;
                if let Some(snapshots) = resp.get("archived_snapshots") {
                    if snapshots.as_object().is_some_and(|o| !o.is_empty()) {
                        if let Some(url) = snapshots
                            .get("closest")
                            .and_then(|c| c.get("url"))
                            .and_then(Value::as_str)
                        {
                            links.emit(Link::new(
                                url.to_string(),
                                LinkContains {
                                    metadata: true,
                                    ..LinkContains::none()
                                },
                                "Watch page (may not work)",
                            ));
                        }
                        archived = true;
                        metaonly = true;
                        break;
                    }
                }
            }
        }

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: Some(videoinfo),
            metaonly,
            comments: false,
            available: Vec::new(),
            error: None,
            maybe_paywalled: false,
            classname: self.classname().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_present_treats_empty_containers_as_absent() {
        assert!(!formats_present(&Value::Array(vec![])));
        assert!(!formats_present(&serde_json::json!({})));
        assert!(formats_present(&serde_json::json!({"video": []})));
    }

    #[test]
    fn collect_format_items_merges_split_video_and_audio() {
        let formats = serde_json::json!({"video": [{"a": 1}], "audio": [{"b": 2}]});
        assert_eq!(collect_format_items(&formats).len(), 2);
    }

    #[test]
    fn format_to_link_flags_unknwn_video_as_standalone_audio() {
        let format = serde_json::json!({
            "url": "youtube.com/watch?v=x",
            "timestamp": "20200101000000",
            "mimetype": "video/mp4",
            "codec": "Unknwn, aac",
            "itag": "140",
        });
        let link = format_to_link(&format);
        assert!(link.contains.standalone_audio);
        assert!(!link.contains.standalone_video);
        assert!(link.note.unwrap().contains("No video, aac audio"));
    }
}
