//! Playboard.co metadata scrape with rotating user agent
//! (grounded on `finder.py`'s `Playboard`).

use async_trait::async_trait;
use rand::Rng;

use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, LinkContains, ProbeResult, now_secs};
use crate::probe::{LinkSink, Probe, ProbeContext};

pub struct Playboard;

const UNRELIABLE_NOTE: &str = "The Playboard scraper is unreliable; please verify values yourself.";

/// Substitutes a `%d`/`%s` placeholder in the configured Chrome-version-like
/// user agent pattern with a stable-looking random version number (§4.4).
fn rotate_user_agent(pattern: &str) -> String {
    let version: u32 = rand::thread_rng().gen_range(0..=100);
    if pattern.contains("%d") {
        pattern.replacen("%d", &version.to_string(), 1)
    } else if pattern.contains("%s") {
        pattern.replacen("%s", &version.to_string(), 1)
    } else {
        pattern.to_string()
    }
}

#[async_trait]
impl Probe for Playboard {
    fn classname(&self) -> &'static str {
        "Playboard"
    }
    fn config_key(&self) -> &'static str {
        "playboard_co"
    }
    fn display_name(&self) -> &'static str {
        "Playboard"
    }

    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError> {
        let pattern = ctx.service.user_agent_pattern().unwrap_or_default();
        let user_agent = rotate_user_agent(pattern);
        let url = format!("https://playboard.co/en/video/{id}");

        let resp = ctx
            .http
            .get(&url)
            .header("User-Agent", &user_agent)
            .send()
            .await?;
        let code = resp.status().as_u16();

        let mut note = UNRELIABLE_NOTE.to_string();
        let archived = match code {
            200 => {
                links.emit(Link::new(
                    url,
                    LinkContains {
                        metadata: true,
                        ..LinkContains::none()
                    },
                    "Metadata",
                ));
                true
            }
            429 => {
                note = "You have been rate-limited by Playboard.".to_string();
                false
            }
            404 => false,
            other => return Err(ProbeError::UnexpectedStatus(other)),
        };

        Ok(ProbeResult {
            archived,
            lastupdated: now_secs(),
            name: self.display_name().to_string(),
            note,
            rawraw: Some(serde_json::json!({"status_code": code, "ua_used": user_agent})),
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
    fn substitutes_percent_d_placeholder() {
        let ua = rotate_user_agent("Chrome/%d.0.0.0");
        assert!(ua.starts_with("Chrome/"));
        assert!(!ua.contains("%d"));
    }

    #[test]
    fn substitutes_percent_s_placeholder() {
        let ua = rotate_user_agent("Chrome/%s.0.0.0");
        assert!(!ua.contains("%s"));
    }

    #[test]
    fn leaves_pattern_without_placeholder_untouched() {
        assert_eq!(rotate_user_agent("fixed-agent"), "fixed-agent");
    }
}
