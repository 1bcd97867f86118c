//! Frozen, process-wide service registry (component C2, §3.2/§4.2/§6.3).
//!
//! Loading a [`Config`] from YAML is the out-of-scope external collaborator's
//! job (§1); this module defines the shape of the value that collaborator
//! hands the engine, plus the accessors the engine reads it through.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::id::VideoId;

/// Per-service configuration record (§3.2). Each of the ~15 services needs
/// a different subset of credential-ish fields, so anything beyond
/// `enabled`/`title` lives in the open `extra` bag and is read with typed
/// accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceConfig {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.get_str("api_key")
    }

    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
    }

    pub fn password(&self) -> Option<&str> {
        self.get_str("password")
    }

    pub fn user_agent_pattern(&self) -> Option<&str> {
        self.get_str("user_agent_pattern")
    }

    pub fn excluded(&self) -> HashSet<VideoId> {
        self.extra
            .get("excluded")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(VideoId::parse)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The frozen, process-wide configuration (§3.2). Loaded once at startup and
/// never mutated afterward — every accessor takes `&self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub experiment_base_url: Option<String>,
    #[serde(default)]
    pub methods: HashMap<String, ServiceConfig>,
}

/// Service keys the engine knows how to register a probe for, alongside the
/// `extra` fields each one requires to be enabled (§7: "missing required
/// credential for an enabled probe" must fail at startup).
const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("youtube", &[]),
    ("ia_wayback", &[]),
    ("ia_details", &[]),
    ("ia_cdx", &[]),
    ("ghostarchive", &[]),
    ("hackint_ya", &["username", "password"]),
    ("distributed_youtube_archive", &[]),
    ("hobune_stream", &[]),
    ("removededm", &["username", "password"]),
    ("filmot", &["api_key"]),
    ("playboard_co", &["user_agent_pattern"]),
    ("altcensored", &[]),
    ("odysee", &[]),
    ("preservetube", &[]),
    ("nyaneonline", &[]),
    ("letsplayindex", &[]),
];

impl Config {
    /// Parses a [`Config`] from a YAML document (§6.3). Unknown top-level
    /// keys are ignored by `serde_yaml`'s default behavior.
    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        serde_yaml::from_str(yaml).map_err(|e| EngineError::Configuration(e.to_string()))
    }

    pub fn load(path: &std::path::Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Configuration(format!("reading {path:?}: {e}")))?;
        Self::from_yaml(&raw)
    }

    pub fn is_enabled(&self, service_key: &str) -> bool {
        self.methods
            .get(service_key)
            .map(|m| m.enabled)
            .unwrap_or(false)
    }

    pub fn get(&self, service_key: &str) -> Option<&ServiceConfig> {
        self.methods.get(service_key)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .unwrap_or("vidarchive/0.1 (+https://github.com/vidarchive/vidarchive)")
    }

    pub fn experiment_base_url(&self) -> Option<&str> {
        self.experiment_base_url.as_deref()
    }

    /// Validates that every *enabled* service has the credentials it needs.
    /// Called once at startup (§4.2, §7); never on the request path.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (key, required) in REQUIRED_FIELDS {
            if !self.is_enabled(key) {
                continue;
            }
            let service = self.methods.get(*key).expect("is_enabled implies present");
            for field in *required {
                if service.get_str(field).is_none() {
                    return Err(EngineError::Configuration(format!(
                        "service '{key}' is enabled but missing required field '{field}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Every service key this engine can register a probe for, in a stable
    /// order (§4.7 step 2 builds the probe roster from this).
    pub fn known_service_keys() -> impl Iterator<Item = &'static str> {
        REQUIRED_FIELDS.iter().map(|(key, _)| *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
user_agent: "test-agent/1.0"
experiment_base_url: "https://example.com/experiment"
methods:
  youtube:
    enabled: true
    title: "YouTube"
  filmot:
    enabled: true
    title: "Filmot"
    api_key: "abc123"
  ghostarchive:
    enabled: false
    title: "GhostArchive"
"#;

    #[test]
    fn parses_sample_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.user_agent(), "test-agent/1.0");
        assert!(config.is_enabled("youtube"));
        assert!(!config.is_enabled("ghostarchive"));
        assert!(!config.is_enabled("nonexistent"));
    }

    #[test]
    fn validate_passes_when_credentials_present() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_on_missing_required_credential() {
        let yaml = r#"
methods:
  filmot:
    enabled: true
    title: "Filmot"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filmot"));
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let yaml = format!("{SAMPLE}\nsome_unknown_key: 42\n");
        assert!(Config::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn excluded_parses_video_ids() {
        let yaml = r#"
methods:
  hackint_ya:
    enabled: true
    title: "#youtubearchive"
    username: "u"
    password: "p"
    excluded:
      - "dQw4w9WgXcQ"
      - "not-an-id"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let svc = config.get("hackint_ya").unwrap();
        let excluded = svc.excluded();
        assert_eq!(excluded.len(), 1);
        assert!(excluded.contains(&VideoId::parse("dQw4w9WgXcQ").unwrap()));
    }
}
