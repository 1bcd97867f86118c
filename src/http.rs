//! Shared, process-wide HTTP client construction (§4.7 step 3, §5).
//!
//! One [`reqwest::Client`] is built at startup and handed to every probe so
//! connection pooling is shared across the whole fan-out instead of each
//! probe opening its own sockets.

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::EngineError;

/// Per-request budget is bounded by the overall per-ID timeout (§5), not
/// enforced here; this is the session-wide ceiling a single stalled
/// connection can consume.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct HttpClientBuilder;

impl HttpClientBuilder {
    pub fn build(config: &Config) -> Result<Client, EngineError> {
        Client::builder()
            .user_agent(config.user_agent().to_string())
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EngineError::Configuration(format!("building http client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_user_agent() {
        let config = Config::default();
        assert!(HttpClientBuilder::build(&config).is_ok());
    }
}
