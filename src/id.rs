//! Canonical YouTube video ID parsing and URL coercion (component C1).

use std::sync::LazyLock;

use regex::Regex;

/// Matches a canonical 11-character YouTube video ID.
///
/// The final character is restricted to the base64 digits that can encode a
/// valid last 2-bit group of the underlying 64-bit ID; any other value can
/// never be a real video ID.
static CANONICAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{10}[AEIMQUYcgkosw048]$").unwrap());

/// URL forms that embed a video ID, tried in order. Each must have exactly
/// one capture group named `id`; the match is case-insensitive on the host.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)youtube\.com/watch\?(?:.*&)?v=(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)youtube\.com/v/(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)youtube\.com/embed/(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)youtube\.com/shorts/(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)youtube\.com/video/(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)youtu\.be/(?P<id>[A-Za-z0-9_-]{11})",
        r"(?i)filmot\.com/video/(?P<id>[A-Za-z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A validated, canonical 11-character YouTube video ID.
///
/// Every [`VideoId`] in existence satisfies [`CANONICAL_ID`]; the only way
/// to construct one is through [`VideoId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Parses a bare ID or a known YouTube/Filmot URL form into a canonical
    /// [`VideoId`]. Returns `None` if nothing matches. Performs no I/O.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if CANONICAL_ID.is_match(trimmed) {
            return Some(Self(trimmed.to_string()));
        }
        for pattern in URL_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(trimmed) {
                let candidate = &caps["id"];
                if CANONICAL_ID.is_match(candidate) {
                    return Some(Self(candidate.to_string()));
                }
            }
        }
        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "dQw4w9WgXcQ";

    #[test]
    fn parses_bare_id() {
        assert_eq!(VideoId::parse(VALID).unwrap().as_str(), VALID);
    }

    #[test]
    fn rejects_bad_last_character() {
        // 'x' is not in the allowed final-character set.
        assert!(VideoId::parse("dQw4w9WgXcx").is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(VideoId::parse("short").is_none());
        assert!(VideoId::parse("dQw4w9WgXcQQ").is_none());
    }

    #[test]
    fn coerces_every_documented_url_form() {
        let forms = [
            format!("https://www.youtube.com/watch?v={VALID}"),
            format!("https://youtube.com/watch?v={VALID}&t=10s"),
            format!("https://youtube.com/v/{VALID}"),
            format!("https://youtube.com/embed/{VALID}"),
            format!("https://youtube.com/shorts/{VALID}"),
            format!("https://youtube.com/video/{VALID}"),
            format!("https://youtu.be/{VALID}"),
            format!("https://filmot.com/video/{VALID}"),
        ];
        for form in forms {
            assert_eq!(
                VideoId::parse(&form).expect("should coerce").as_str(),
                VALID,
                "failed on {form}"
            );
        }
    }

    #[test]
    fn is_case_insensitive_on_host() {
        let url = format!("https://WWW.YouTube.COM/watch?v={VALID}");
        assert_eq!(VideoId::parse(&url).unwrap().as_str(), VALID);
    }

    #[test]
    fn parse_is_idempotent() {
        let once = VideoId::parse(VALID).unwrap();
        let twice = VideoId::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_garbage() {
        assert!(VideoId::parse("not-an-id").is_none());
        assert!(VideoId::parse("https://example.com/").is_none());
    }
}
