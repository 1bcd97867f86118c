//! Error taxonomy (§7). Client-facing errors are distinguished from the
//! internal plumbing errors a probe can raise; the two never mix.

use thiserror::Error;

/// Errors returned to the caller of the public engine API. These are never
/// cached (§7) and never silently folded into a [`crate::model::ProbeResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("'{0}' is not a valid YouTube video ID")]
    InvalidVideoId(String),

    #[error("requested API version {requested} is higher than the current version {current}")]
    TargetApiVersionTooHigh { requested: u32, current: u32 },

    #[error("requested API version {requested} is lower than the oldest supported version {oldest}")]
    TargetApiVersionTooLow { requested: u32, oldest: u32 },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors a single probe implementation can raise while `_run`-ning. The
/// orchestrator catches every variant and folds it into an error
/// [`crate::model::ProbeResult`] (§4.3); it never surfaces as an
/// [`EngineError`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected upstream status code {0}")]
    UnexpectedStatus(u16),

    #[error("upstream response violated its contract: {0}")]
    ContractViolation(String),

    #[error("upstream login failed: {0}")]
    LoginFailed(String),
}

impl ProbeError {
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_video_id_message_includes_input() {
        let err = EngineError::InvalidVideoId("not-an-id".into());
        assert!(err.to_string().contains("not-an-id"));
    }

    #[test]
    fn version_errors_report_both_versions() {
        let err = EngineError::TargetApiVersionTooHigh {
            requested: 9,
            current: 5,
        };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('5'));
    }
}
