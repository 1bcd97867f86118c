//! Per-service minimum inter-request spacing (component C5, §4.5).
//!
//! State lives in one small record per probe, guarded by its own lock —
//! not in a global/module-level variable, per the redesign note in §9.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::model::now_secs;

/// Shared across every probe instance for the lifetime of the process. Keyed
/// by the probe's `classname` so each service gets its own clock.
#[derive(Default)]
pub struct CooldownRegistry {
    last_retrieved_at: DashMap<&'static str, Arc<Mutex<f64>>>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, classname: &'static str) -> Arc<Mutex<f64>> {
        self.last_retrieved_at
            .entry(classname)
            .or_insert_with(|| Arc::new(Mutex::new(0.0)))
            .clone()
    }

    /// Blocks (cooperatively, without holding up other probes) until at
    /// least `cooldown_secs` have elapsed since the last call for this
    /// `classname`, then reserves the slot for the caller.
    pub async fn wait(&self, classname: &'static str, cooldown_secs: f64) {
        if cooldown_secs <= 0.0 {
            return;
        }
        let slot = self.slot(classname);
        let mut last = slot.lock().await;
        let elapsed = now_secs() - *last;
        if elapsed < cooldown_secs {
            sleep(Duration::from_secs_f64(cooldown_secs - elapsed)).await;
        }
        *last = now_secs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enforces_minimum_spacing() {
        let registry = CooldownRegistry::new();
        let start = now_secs();
        registry.wait("filmot", 0.2).await;
        registry.wait("filmot", 0.2).await;
        let elapsed = now_secs() - start;
        assert!(elapsed >= 0.2, "expected at least 0.2s gap, got {elapsed}");
    }

    #[tokio::test]
    async fn different_probes_do_not_share_a_clock() {
        let registry = CooldownRegistry::new();
        registry.wait("filmot", 5.0).await;
        let start = now_secs();
        registry.wait("hobune_stream", 0.0).await;
        assert!(now_secs() - start < 1.0);
    }

    #[tokio::test]
    async fn zero_cooldown_never_waits() {
        let registry = CooldownRegistry::new();
        let start = now_secs();
        registry.wait("youtube", 0.0).await;
        registry.wait("youtube", 0.0).await;
        assert!(now_secs() - start < 0.05);
    }
}
