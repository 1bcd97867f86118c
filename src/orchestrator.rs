//! Fan-out scheduling, error capture, link folding, and verdict synthesis
//! (component C7, §4.7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::cooldown::CooldownRegistry;
use crate::envelope::{ResponseEnvelope, StreamItem};
use crate::error::EngineError;
use crate::http::HttpClientBuilder;
use crate::id::VideoId;
use crate::model::{ProbeResult, Verdict};
use crate::probe::{LinkSink, LoginLockRegistry, Probe, ProbeContext};
use crate::services;

/// Session-wide deadline bounding a single probe's entire run (§4.3, §5).
const SESSION_TIMEOUT: Duration = Duration::from_secs(20);

/// The concurrent multi-service probe engine (§2 C7). Built once from a
/// frozen [`Config`] and reused for every request; cheap to clone since
/// every field is an `Arc` or a pooled client (§9: "explicit `Engine::new`
/// constructor" rather than module-level state).
#[derive(Clone)]
pub struct Engine {
    http: reqwest::Client,
    config: Arc<Config>,
    cache: Arc<ResultCache>,
    cooldowns: Arc<CooldownRegistry>,
    login_locks: Arc<LoginLockRegistry>,
    probes: Vec<Arc<dyn Probe>>,
}

impl Engine {
    /// Validates `config`, builds the shared HTTP client, and narrows the
    /// probe roster to services the config enables (§4.2: disabled services
    /// never enter the roster for the process's lifetime).
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let http = HttpClientBuilder::build(&config)?;
        let config = Arc::new(config);
        let probes: Vec<Arc<dyn Probe>> = services::all_probes()
            .into_iter()
            .filter(|probe| config.is_enabled(probe.config_key()))
            .collect();

        Ok(Self {
            http,
            config,
            cache: Arc::new(ResultCache::default()),
            cooldowns: Arc::new(CooldownRegistry::new()),
            login_locks: Arc::new(LoginLockRegistry::new()),
            probes,
        })
    }

    fn context_for(&self, probe: &Arc<dyn Probe>) -> ProbeContext {
        let service = self
            .config
            .get(probe.config_key())
            .cloned()
            .unwrap_or_default();
        ProbeContext {
            http: self.http.clone(),
            config: self.config.clone(),
            service,
            cooldowns: self.cooldowns.clone(),
            login_locks: self.login_locks.clone(),
        }
    }

    /// Batch entry point (§6.1). A bad ID never touches the network: it
    /// short-circuits to an empty `bad.id` envelope (§4.7 step 1).
    pub async fn generate(&self, raw_id: &str, include_raw: bool) -> ResponseEnvelope {
        let Some(id) = VideoId::parse(raw_id) else {
            return ResponseEnvelope::bad_id(raw_id);
        };

        let mut running = FuturesUnordered::new();
        for probe in &self.probes {
            let probe = probe.clone();
            let id = id.clone();
            let ctx = self.context_for(&probe);
            let cache = self.cache.clone();
            running.push(async move { run_probe(probe, id, ctx, include_raw, cache).await });
        }

        let mut keys = Vec::with_capacity(self.probes.len());
        while let Some(result) = running.next().await {
            keys.push(result);
        }
        ResponseEnvelope::ok(id.as_str(), keys)
    }

    /// Streaming entry point (§6.1). Unlike `generate`, a bad ID is an
    /// error rather than a degenerate envelope (§4.7 step 1).
    pub async fn generate_stream(
        &self,
        raw_id: &str,
        include_raw: bool,
    ) -> Result<mpsc::UnboundedReceiver<StreamItem>, EngineError> {
        let id = VideoId::parse(raw_id).ok_or_else(|| EngineError::InvalidVideoId(raw_id.to_string()))?;
        let (tx, rx) = mpsc::unbounded_channel();

        let names: HashMap<String, String> = self
            .probes
            .iter()
            .map(|p| (p.classname().to_string(), p.display_name().to_string()))
            .collect();
        let _ = tx.send(StreamItem::Names(names));

        let engine = self.clone();
        tokio::spawn(async move {
            let mut running = FuturesUnordered::new();
            for probe in &engine.probes {
                let probe = probe.clone();
                let id = id.clone();
                let ctx = engine.context_for(&probe);
                let cache = engine.cache.clone();
                running.push(async move { run_probe(probe, id, ctx, include_raw, cache).await });
            }

            let mut keys = Vec::with_capacity(engine.probes.len());
            while let Some(result) = running.next().await {
                for link in &result.available {
                    // Links precede their owning result, in emission order
                    // (§4.7 ordering guarantee); dropped silently if the
                    // receiver already hung up.
                    let _ = tx.send(StreamItem::Link(link.clone()));
                }
                let _ = tx.send(StreamItem::Result(result.clone()));
                keys.push(result);
            }
            let _ = tx.send(StreamItem::End);
            let _ = tx.send(StreamItem::Verdict(Verdict::synthesize(&keys)));
        });

        Ok(rx)
    }
}

/// Runs one probe to completion: consumes its [`LinkSink`], stamps each
/// link with the probe's `classname`, folds them into `result.available`,
/// recomputes `comments` from the links actually collected, and turns a
/// probe error or a blown deadline into an error [`ProbeResult`] (§4.3,
/// §4.7 step 4). Cached per `(classname, id, include_raw)` (§4.6).
async fn run_probe(
    probe: Arc<dyn Probe>,
    id: VideoId,
    ctx: ProbeContext,
    include_raw: bool,
    cache: Arc<ResultCache>,
) -> ProbeResult {
    let classname = probe.classname();
    let compute_id = id.clone();
    cache
        .get_or_compute(classname, &id, include_raw, move || async move {
            let id = compute_id;
            let (sink, mut link_rx) = LinkSink::new();
            let outcome = tokio::time::timeout(SESSION_TIMEOUT, probe.run(&id, &ctx, &sink)).await;
            drop(sink);

            let mut links = Vec::new();
            while let Some(mut link) = link_rx.recv().await {
                link.classname = classname.to_string();
                links.push(link);
            }
            let any_comment_link = links.iter().any(|l| l.contains.comments);

            let mut result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => {
                    tracing::warn!(probe = classname, %err, "probe failed");
                    ProbeResult::from_error(classname, probe.display_name(), err.to_string())
                }
                Err(_elapsed) => {
                    tracing::warn!(probe = classname, "probe exceeded session deadline");
                    ProbeResult::from_error(
                        classname,
                        probe.display_name(),
                        "probe exceeded the session deadline",
                    )
                }
            };

            if any_comment_link {
                result.comments = true;
            }
            result.available = links;
            if !include_raw {
                result.rawraw = None;
            }
            result
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config::from_yaml(
            r#"
methods:
  youtube:
    enabled: true
    title: "YouTube"
"#,
        )
        .unwrap()
    }

    #[test]
    fn disabled_services_are_excluded_from_the_roster() {
        let engine = Engine::new(Config::default()).unwrap();
        assert!(engine.probes.is_empty());
    }

    #[test]
    fn enabled_services_enter_the_roster() {
        let engine = Engine::new(sample_config()).unwrap();
        assert_eq!(engine.probes.len(), 1);
        assert_eq!(engine.probes[0].classname(), "YouTube");
    }

    #[tokio::test]
    async fn bad_id_short_circuits_without_running_any_probe() {
        let engine = Engine::new(sample_config()).unwrap();
        let envelope = engine.generate("not-an-id", false).await;
        assert!(matches!(
            envelope.status,
            crate::envelope::EnvelopeStatus::BadId
        ));
        assert!(envelope.keys.is_empty());
    }

    #[tokio::test]
    async fn bad_id_is_an_error_in_streaming_mode() {
        let engine = Engine::new(sample_config()).unwrap();
        let err = engine.generate_stream("not-an-id", false).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidVideoId(_)));
    }
}
