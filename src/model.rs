//! The wire data model shared by every probe and the orchestrator
//! (component C3, §3.3–3.6).

use serde::{Deserialize, Serialize};

/// What a [`Link`] is expected to contain. Purely descriptive: the engine
/// never verifies these claims against the target URL.
///
/// Field names are the wire names verbatim (no camelCase rename): the public
/// API surface's literal JSON shape (§3.3, §8 S1/S4) uses snake_case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContains {
    #[serde(default)]
    pub video: bool,
    #[serde(default)]
    pub metadata: bool,
    #[serde(default)]
    pub comments: bool,
    #[serde(default)]
    pub thumbnail: bool,
    #[serde(default)]
    pub captions: bool,
    /// Video track only, no audio.
    #[serde(default)]
    pub standalone_video: bool,
    /// Audio track only, no video.
    #[serde(default)]
    pub standalone_audio: bool,
    /// A single still frame, not a full video.
    #[serde(default)]
    pub single_frame: bool,
}

impl LinkContains {
    pub fn none() -> Self {
        Self::default()
    }

    /// All of video/metadata/comments/thumbnail/captions set — used by
    /// probes that can't tell what subset of an item they're looking at.
    pub fn all() -> Self {
        Self {
            video: true,
            metadata: true,
            comments: true,
            thumbnail: true,
            captions: true,
            standalone_video: false,
            standalone_audio: false,
            single_frame: false,
        }
    }
}

/// A single retrievable artifact advertised by a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub contains: LinkContains,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The probe's stable identifier. Filled in by the orchestrator when the
    /// link is observed, not by the probe itself.
    #[serde(default)]
    pub classname: String,
}

impl Link {
    pub fn new(url: impl Into<String>, contains: LinkContains, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            contains,
            title: title.into(),
            note: None,
            classname: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A single probe's verdict about a video ID (§3.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub archived: bool,
    /// Seconds since the Unix epoch, wall-clock time of completion.
    pub lastupdated: f64,
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rawraw: Option<serde_json::Value>,
    pub metaonly: bool,
    #[serde(default)]
    pub comments: bool,
    #[serde(default)]
    pub available: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub maybe_paywalled: bool,
    pub classname: String,
}

impl ProbeResult {
    /// Builds the error result the orchestrator produces when a probe's
    /// future resolves to an error rather than a terminal result (§4.3, §7).
    pub fn from_error(classname: &str, display_name: &str, message: impl Into<String>) -> Self {
        Self {
            archived: false,
            lastupdated: now_secs(),
            name: display_name.to_string(),
            note: format!("An error occured while retrieving data from {display_name}."),
            rawraw: None,
            metaonly: false,
            comments: false,
            available: Vec::new(),
            error: Some(message.into()),
            maybe_paywalled: false,
            classname: classname.to_string(),
        }
    }
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut qualifier = String::new();
        if self.metaonly {
            qualifier.push_str("(metadata only)");
        }
        if self.comments {
            if !qualifier.is_empty() {
                qualifier.push(' ');
            }
            qualifier.push_str("(incl. comments)");
        }
        writeln!(f, "- Service Name: {}", self.name)?;
        writeln!(f, "  Archived? {} {}", self.archived, qualifier)?;
        if let Some(link) = self.available.first() {
            writeln!(f, "  Link: {}", link.url)?;
        }
        write!(f, "\t{}", self.note.trim())
    }
}

/// The aggregated, human- and machine-readable summary over every probe
/// result (§3.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub video: bool,
    pub metaonly: bool,
    pub comments: bool,
    pub human_friendly: String,
}

impl Verdict {
    pub fn synthesize(results: &[ProbeResult]) -> Self {
        let video = results.iter().any(|r| r.archived && !r.metaonly);
        let metaonly = results.iter().any(|r| r.archived && r.metaonly);
        let comments = results.iter().any(|r| r.comments);

        let mut human_friendly = if video {
            "Archived! ".to_string()
        } else if metaonly {
            "Archived with metadata only. ".to_string()
        } else {
            "Video not found. ".to_string()
        };
        if comments {
            human_friendly.push_str("(with comments)");
        }

        Self {
            video,
            metaonly,
            comments,
            human_friendly,
        }
    }
}

pub(crate) fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archived_video() -> ProbeResult {
        ProbeResult {
            archived: true,
            lastupdated: 0.0,
            name: "YouTube".into(),
            note: String::new(),
            rawraw: None,
            metaonly: false,
            comments: false,
            available: vec![],
            error: None,
            maybe_paywalled: false,
            classname: "YouTube".into(),
        }
    }

    #[test]
    fn verdict_prefers_video_over_metaonly() {
        let mut meta = archived_video();
        meta.metaonly = true;
        let video = archived_video();
        let verdict = Verdict::synthesize(&[meta, video]);
        assert!(verdict.video);
        assert_eq!(verdict.human_friendly, "Archived! ");
    }

    #[test]
    fn verdict_metaonly_when_no_full_video() {
        let mut meta = archived_video();
        meta.metaonly = true;
        let verdict = Verdict::synthesize(&[meta]);
        assert!(!verdict.video);
        assert!(verdict.metaonly);
        assert_eq!(verdict.human_friendly, "Archived with metadata only. ");
    }

    #[test]
    fn verdict_not_found_when_nothing_archived() {
        let mut not_archived = archived_video();
        not_archived.archived = false;
        let verdict = Verdict::synthesize(&[not_archived]);
        assert_eq!(verdict.human_friendly, "Video not found. ");
    }

    #[test]
    fn verdict_appends_comments_suffix() {
        let mut with_comments = archived_video();
        with_comments.comments = true;
        let verdict = Verdict::synthesize(&[with_comments]);
        assert_eq!(verdict.human_friendly, "Archived! (with comments)");
    }

    #[test]
    fn error_result_has_standard_note() {
        let result = ProbeResult::from_error("GhostArchive", "GhostArchive", "connection reset");
        assert!(!result.archived);
        assert_eq!(
            result.note,
            "An error occured while retrieving data from GhostArchive."
        );
        assert_eq!(result.error.as_deref(), Some("connection reset"));
    }
}
