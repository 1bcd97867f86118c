//! Internet Archive CDX thumbnail search across nine thumbnail hosts
//! (grounded on `finder.py`'s `ArchiveOrgCDX`).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct ArchiveOrgCdxThumbs;

fn cdx_urls(id: &VideoId) -> [String; 9] {
    [
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i1.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i2.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i3.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i4.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=i.ytimg.com/vi_webp/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/webp&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=s.ytimg.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=ytimg.googleusercontent.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/webp&output=json"
        ),
        format!(
            "https://web.archive.org/cdx/search/cdx?url=img.youtube.com/vi/{id}*&collapse=digest&filter=statuscode:200&mimetype:image/jpeg&output=json"
        ),
    ]
}

/// Highest quality first; ties broken on recency (§4.4).
const QUALITY_ORDER: &[&str] = &[
    "maxresdefault.jpg",
    "sddefault.jpg",
    "hqdefault.jpg",
    "0.jpg",
    "high.jpg",
    "mqdefault.jpg",
    "medium.jpg",
    "default.jpg",
    "1.jpg",
    "2.jpg",
    "3.jpg",
];

fn quality_rank(url: &str) -> usize {
    QUALITY_ORDER
        .iter()
        .position(|needle| url.contains(needle))
        .unwrap_or(QUALITY_ORDER.len() + 1)
}

#[async_trait]
impl Probe for ArchiveOrgCdxThumbs {
    fn classname(&self) -> &'static str {
        "ArchiveOrgCDX"
    }
    fn config_key(&self) -> &'static str {
        "ia_cdx"
    }
    fn display_name(&self) -> &'static str {
        "Internet Archive (thumbnail CDX)"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let mut results: Vec<(String, String)> = Vec::new();

        for url in cdx_urls(id) {
            let rows: Value = ctx
                .http
                .get(&url)
                .timeout(Duration::from_secs(12))
                .send()
                .await?
                .json()
                .await?;
            let Some(rows) = rows.as_array() else {
                continue;
            };
            for row in rows {
                let Some(row) = row.as_array() else { continue };
                let key = row.first().and_then(Value::as_str).unwrap_or_default();
                if key == "urlkey" {
                    continue;
                }
                let timestamp = row.get(1).and_then(Value::as_str).unwrap_or_default();
                let original = row.get(2).and_then(Value::as_str).unwrap_or_default();
                results.push((timestamp.to_string(), original.to_string()));
            }
        }

        // Most recent first, then highest quality first.
        results.sort_by(|a, b| b.0.cmp(&a.0));
        results.sort_by_key(|(_, original)| quality_rank(original));

        let archived = if let Some((timestamp, original)) = results.first() {
            links.emit(Link::new(
                format!("https://web.archive.org/web/{timestamp}/{original}"),
                LinkContains {
                    thumbnail: true,
                    ..LinkContains::none()
                },
                "Thumbnail",
            ));
            true
        } else {
            false
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: String::new(),
            rawraw: None,
            metaonly: true,
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
    fn quality_rank_prefers_maxres_over_hq() {
        assert!(quality_rank("foo/maxresdefault.jpg") < quality_rank("foo/hqdefault.jpg"));
    }

    #[test]
    fn quality_rank_treats_unknown_names_as_lowest() {
        assert!(quality_rank("foo/weird.jpg") > quality_rank("foo/hqdefault.jpg"));
    }

    #[test]
    fn nine_hosts_are_queried() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(cdx_urls(&id).len(), 9);
    }
}
