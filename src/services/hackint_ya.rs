//! `#youtubearchive` IRC-backed archive, queried over HTTP with basic auth
//! (grounded on `finder.py`'s `HackintYa`).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct HackintYa;

const RETRIEVAL_NOTE: &str = "Video retrieval is currently not available for technical reasons. \
Check back later for access instructions. This may take weeks or months.";

/// A comment-count line counts as "has comments" unless it's blank, the
/// empty-set marker, or a literal zero (§4.4, the original's odd mojibake
/// `"âˆ…"` is the UTF-8 mangling of `∅`).
fn line_has_comments(line: &str) -> bool {
    let trimmed = line.trim_matches(|c: char| c == '∅' || c.is_whitespace());
    !trimmed.is_empty() && trimmed != "0"
}

#[async_trait]
impl Probe for HackintYa {
    fn classname(&self) -> &'static str {
        "HackintYa"
    }
    fn config_key(&self) -> &'static str {
        "hackint_ya"
    }
    fn display_name(&self) -> &'static str {
        "#youtubearchive"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        _links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let excluded = ctx.service.excluded();
        if excluded.contains(id) {
            return Ok(ProbeResult {
                archived: false,
                lastupdated: now_secs(),
                name: self.display_name().to_string(),
                note: String::new(),
                rawraw: Some(serde_json::json!({"count": 0, "comment_count": ""})),
                metaonly: false,
                comments: false,
                available: Vec::new(),
                error: None,
                maybe_paywalled: false,
                classname: self.classname().to_string(),
            });
        }

        let username = ctx.service.username().unwrap_or_default();
        let password = ctx.service.password().unwrap_or_default();

        let count_text = ctx
            .http
            .get(format!("https://ya.borg.xyz/cgi-bin/capture-count?v={id}"))
            .basic_auth(username, Some(password))
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .text()
            .await?;
        if count_text.trim().is_empty() {
            return Err(ProbeError::contract("server returned an empty capture count"));
        }
        let count: i64 = count_text
            .trim()
            .parse()
            .map_err(|_| ProbeError::contract("capture count was not an integer"))?;

        let comment_counts = ctx
            .http
            .get(format!(
                "https://ya.borg.xyz/cgi-bin/capture-comment-counts?v={id}"
            ))
            .basic_auth(username, Some(password))
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .text()
            .await?;

        let archived = count > 0;
        let comments = comment_counts.lines().any(line_has_comments);

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note: if archived { RETRIEVAL_NOTE.to_string() } else { String::new() },
            rawraw: Some(serde_json::json!({"count": count, "comment_counts": comment_counts})),
            metaonly: false,
            comments: archived && comments,
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
    fn blank_and_zero_lines_do_not_count_as_comments() {
        assert!(!line_has_comments(""));
        assert!(!line_has_comments("0"));
        assert!(!line_has_comments("∅"));
    }

    #[test]
    fn a_nonzero_count_counts_as_comments() {
        assert!(line_has_comments("4"));
    }
}
