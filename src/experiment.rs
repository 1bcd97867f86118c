//! Fire-and-forget experiment reporting (§4.4 WB fakeurl note, §5).
//!
//! Probes that want to tell the operators "something unusual happened"
//! without affecting their own result post one of these; failures are
//! swallowed, never surfaced to the orchestrator.

use crate::id::VideoId;
use crate::probe::ProbeContext;

/// Posts `report` (merged with `experiment`/`id`) to the configured
/// experiment endpoint, if any. Best-effort: logs at `debug` on failure and
/// never returns an error.
pub async fn submit(
    ctx: &ProbeContext,
    experiment_name: &str,
    video_id: &VideoId,
    mut report: serde_json::Value,
) {
    let Some(base_url) = ctx.config.experiment_base_url() else {
        return;
    };
    if let Some(obj) = report.as_object_mut() {
        obj.insert("experiment".into(), experiment_name.into());
        obj.insert("id".into(), video_id.as_str().into());
    }
    if let Err(err) = ctx.http.post(base_url).json(&report).send().await {
        tracing::debug!(experiment = experiment_name, %err, "experiment report failed");
    }
}
