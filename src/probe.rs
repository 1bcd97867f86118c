//! The probe contract every archive-probing service implements (component
//! C3's behavioral half, §4.3), plus the shared context and link-yielding
//! channel each probe runs against.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};

use crate::config::{Config, ServiceConfig};
use crate::cooldown::CooldownRegistry;
use crate::error::ProbeError;
use crate::id::VideoId;
use crate::model::{Link, ProbeResult};

/// One end of the "yield zero or more links, then exactly one result"
/// channel a probe writes to while it runs. Modeled as an unbounded mpsc
/// sender rather than a literal tagged-union item, since the orchestrator
/// already distinguishes the two cases by type: [`Link`]s arrive through
/// this sink, the terminal [`ProbeResult`] is the `run` future's return
/// value (§9 redesign note on heterogeneous async generators).
#[derive(Clone)]
pub struct LinkSink(mpsc::UnboundedSender<Link>);

impl LinkSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Link>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    /// Yields a link. Silently dropped if the receiving end has already gone
    /// away (the orchestrator stopped listening); a probe should never treat
    /// that as a reason to abort its own run.
    pub fn emit(&self, link: Link) {
        let _ = self.0.send(link);
    }
}

/// Registers one shared lock per probe classname so a login flow that only
/// needs to run once (e.g. removededm's MediaWiki session) is single-flight
/// across concurrently running probe instances, the same pattern
/// [`CooldownRegistry`] uses for rate spacing.
#[derive(Default)]
pub struct LoginLockRegistry {
    locks: DashMap<&'static str, Arc<Mutex<()>>>,
}

impl LoginLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, classname: &'static str) -> Arc<Mutex<()>> {
        self.locks
            .entry(classname)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Everything a probe needs that isn't the video ID itself: the shared HTTP
/// client, the frozen global config, this probe's own service config, and
/// the shared cooldown/login-lock registries (§4.2, §4.5).
#[derive(Clone)]
pub struct ProbeContext {
    pub http: reqwest::Client,
    pub config: Arc<Config>,
    pub service: ServiceConfig,
    pub cooldowns: Arc<CooldownRegistry>,
    pub login_locks: Arc<LoginLockRegistry>,
}

impl ProbeContext {
    /// Waits out this probe's configured cooldown, if any. Services with no
    /// minimum spacing requirement pass `0.0` and return immediately.
    pub async fn wait_cooldown(&self, classname: &'static str, cooldown_secs: f64) {
        self.cooldowns.wait(classname, cooldown_secs).await;
    }
}

/// A single archive-probing service (component C3/C4, §4.3).
///
/// Implementations must be side-effect-light on construction — all network
/// access happens inside `run`, driven by the per-call [`ProbeContext`] — so
/// a roster can be built once at startup and reused for every request
/// (§9: "probe registration as a pure function of config").
#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable identifier stamped onto every [`Link`] and [`ProbeResult`] this
    /// probe produces. Never changes across releases (§3.1's external
    /// consumers may key off it).
    fn classname(&self) -> &'static str;

    /// The key this probe's settings live under in [`Config::methods`].
    fn config_key(&self) -> &'static str;

    /// Human-readable name used in [`ProbeResult::name`] and error notes.
    fn display_name(&self) -> &'static str;

    /// Probes the given video ID, yielding any number of [`Link`]s through
    /// `links` before resolving to its terminal [`ProbeResult`]. A returned
    /// `Err` is caught by the orchestrator and folded into an error result
    /// (§4.3, §7) — it is never propagated to the engine's caller.
    async fn run(
        &self,
        id: &VideoId,
        ctx: &ProbeContext,
        links: &LinkSink,
    ) -> Result<ProbeResult, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Probe for Echo {
        fn classname(&self) -> &'static str {
            "Echo"
        }
        fn config_key(&self) -> &'static str {
            "echo"
        }
        fn display_name(&self) -> &'static str {
            "Echo"
        }
        async fn run(
            &self,
            id: &VideoId,
            _ctx: &ProbeContext,
            links: &LinkSink,
        ) -> Result<ProbeResult, ProbeError> {
            links.emit(Link::new(
                format!("https://example.com/{id}"),
                crate::model::LinkContains::none(),
                "echo",
            ));
            Ok(ProbeResult {
                archived: true,
                lastupdated: 0.0,
                name: "Echo".into(),
                note: String::new(),
                rawraw: None,
                metaonly: false,
                comments: false,
                available: vec![],
                error: None,
                maybe_paywalled: false,
                classname: "Echo".into(),
            })
        }
    }

    #[tokio::test]
    async fn link_sink_delivers_before_the_result_resolves() {
        let (sink, mut rx) = LinkSink::new();
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let ctx = ProbeContext {
            http: reqwest::Client::new(),
            config: Arc::new(Config::default()),
            service: ServiceConfig::default(),
            cooldowns: Arc::new(CooldownRegistry::new()),
            login_locks: Arc::new(LoginLockRegistry::new()),
        };
        let probe = Echo;
        let result = probe.run(&id, &ctx, &sink).await.unwrap();
        drop(sink);

        assert!(result.archived);
        let link = rx.recv().await.expect("echo should have emitted a link");
        assert!(link.url.contains("dQw4w9WgXcQ"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn login_lock_is_shared_by_classname() {
        let registry = LoginLockRegistry::new();
        let a = registry.lock_for("removededm");
        let b = registry.lock_for("removededm");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
