//! Batch/stream response envelopes and the API version coercion ladder
//! (component C8, §3.7, §4.8, §9).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::EngineError;
use crate::model::{Link, ProbeResult, Verdict};

pub const CURRENT_API_VERSION: u32 = 5;
pub const OLDEST_API_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnvelopeStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "bad.id")]
    BadId,
}

/// The batch response shape (§3.7). Always constructed at
/// [`CURRENT_API_VERSION`]; older wire shapes are produced on demand by
/// [`coerce_envelope_to_version`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: String,
    pub status: EnvelopeStatus,
    pub keys: Vec<ProbeResult>,
    pub verdict: Verdict,
    pub api_version: u32,
}

impl ResponseEnvelope {
    pub fn ok(id: impl Into<String>, keys: Vec<ProbeResult>) -> Self {
        let verdict = Verdict::synthesize(&keys);
        Self {
            id: id.into(),
            status: EnvelopeStatus::Ok,
            keys,
            verdict,
            api_version: CURRENT_API_VERSION,
        }
    }

    pub fn bad_id(raw: &str) -> Self {
        Self {
            id: raw.to_string(),
            status: EnvelopeStatus::BadId,
            keys: Vec::new(),
            verdict: Verdict::synthesize(&[]),
            api_version: CURRENT_API_VERSION,
        }
    }
}

/// The streaming response shape's four phases (§3.7): one names map, then
/// interleaved links/results, then a null sentinel, then exactly one
/// verdict. `#[serde(untagged)]` gives `End` a literal `null` wire
/// representation for free, since serde serializes an untagged unit variant
/// as `null` (§9: "async generators yielding heterogeneous items").
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamItem {
    Names(HashMap<String, String>),
    Link(Link),
    Result(ProbeResult),
    Verdict(Verdict),
    End,
}

pub fn validate_api_version(target: u32) -> Result<(), EngineError> {
    if target > CURRENT_API_VERSION {
        return Err(EngineError::TargetApiVersionTooHigh {
            requested: target,
            current: CURRENT_API_VERSION,
        });
    }
    if target < OLDEST_API_VERSION {
        return Err(EngineError::TargetApiVersionTooLow {
            requested: target,
            oldest: OLDEST_API_VERSION,
        });
    }
    Ok(())
}

/// 5→4: derive `capcount`, flatten `available` to the first link's URL (or
/// null), and recompute `metaonly`/`comments` from that first link's
/// `contains` (§4.8).
fn convert_result_5_to_4(result: &mut Value) {
    let archived = result
        .get("archived")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let available = result
        .get("available")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if let Some(obj) = result.as_object_mut() {
        obj.insert("capcount".into(), json!(if archived { 1 } else { 0 }));
        if let Some(first) = available.first() {
            let contains = first.get("contains");
            let video = contains
                .and_then(|c| c.get("video"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let comments = contains
                .and_then(|c| c.get("comments"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            obj.insert("metaonly".into(), json!(!video));
            obj.insert("comments".into(), json!(comments));
            obj.insert(
                "available".into(),
                first.get("url").cloned().unwrap_or(Value::Null),
            );
        } else {
            obj.insert("available".into(), Value::Null);
        }
    }
}

/// 3→2: `error` becomes a boolean; a non-null error is moved into `rawraw`
/// (§4.8).
fn convert_result_3_to_2(result: &mut Value) {
    let error = result.get("error").cloned().unwrap_or(Value::Null);
    if let Some(obj) = result.as_object_mut() {
        if error.is_null() {
            obj.insert("error".into(), json!(false));
        } else {
            obj.insert("rawraw".into(), error);
            obj.insert("error".into(), json!(true));
        }
    }
}

fn step_down_result(result: &mut Value, from_version: u32) {
    match from_version {
        5 => convert_result_5_to_4(result),
        4 => {}
        3 => convert_result_3_to_2(result),
        _ => {}
    }
}

fn step_down_envelope(envelope: &mut Value, from_version: u32) {
    if let Some(keys) = envelope.get_mut("keys").and_then(Value::as_array_mut) {
        for key in keys {
            step_down_result(key, from_version);
        }
    }
}

/// Downgrades an already-serialized envelope (tagged with its own
/// `api_version`) further to `target`. Used both directly and as the second
/// half of the chain property in §8.6: `coerce(n)` then `coerce(m)` for
/// `m ≤ n` must equal `coerce(m)` applied to the canonical envelope.
pub fn coerce_value_to_version(mut value: Value, target: u32) -> Result<Value, EngineError> {
    validate_api_version(target)?;
    let current = value
        .get("api_version")
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(CURRENT_API_VERSION);
    if target > current {
        return Err(EngineError::TargetApiVersionTooHigh {
            requested: target,
            current,
        });
    }

    let mut version = current;
    while version > target {
        step_down_envelope(&mut value, version);
        version -= 1;
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("api_version".into(), json!(target));
    }
    Ok(value)
}

/// Coerces a canonical envelope to `target` (§4.8). Equivalent to
/// `coerce_value_to_version(serde_json::to_value(envelope), target)` but
/// does not require the caller to serialize it first.
pub fn coerce_envelope_to_version(
    envelope: &ResponseEnvelope,
    target: u32,
) -> Result<Value, EngineError> {
    validate_api_version(target)?;
    let value = serde_json::to_value(envelope).expect("ResponseEnvelope always serializes");
    coerce_value_to_version(value, target)
}

/// Coerces a single stream item to `target`, lazily, one item at a time
/// (§4.8). `Link` items are dropped entirely below v5, since at v4 and
/// below `available` is already flattened into the owning `ProbeResult`.
/// Returns `None` when the item should be skipped in the downgraded stream.
pub fn coerce_stream_item(item: &StreamItem, target: u32) -> Option<Value> {
    match item {
        StreamItem::Names(map) => Some(serde_json::to_value(map).expect("map always serializes")),
        StreamItem::Link(_) => {
            if target < CURRENT_API_VERSION {
                None
            } else {
                Some(serde_json::to_value(item).expect("StreamItem always serializes"))
            }
        }
        StreamItem::Result(result) => {
            let mut value = serde_json::to_value(result).expect("ProbeResult always serializes");
            let mut version = CURRENT_API_VERSION;
            while version > target {
                step_down_result(&mut value, version);
                version -= 1;
            }
            Some(value)
        }
        StreamItem::Verdict(verdict) => {
            Some(serde_json::to_value(verdict).expect("Verdict always serializes"))
        }
        StreamItem::End => Some(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkContains;

    fn sample_result(archived: bool, links: Vec<Link>) -> ProbeResult {
        ProbeResult {
            archived,
            lastupdated: 0.0,
            name: "YouTube".into(),
            note: String::new(),
            rawraw: Some(json!({"raw": true})),
            metaonly: false,
            comments: false,
            available: links,
            error: None,
            maybe_paywalled: false,
            classname: "YouTube".into(),
        }
    }

    fn watch_link() -> Link {
        Link::new(
            "https://youtu.be/dQw4w9WgXcQ",
            LinkContains {
                video: true,
                metadata: true,
                ..LinkContains::none()
            },
            "Watch page",
        )
    }

    #[test]
    fn bad_id_envelope_matches_documented_shape() {
        let envelope = ResponseEnvelope::bad_id("not-an-id");
        assert!(matches!(envelope.status, EnvelopeStatus::BadId));
        assert!(envelope.keys.is_empty());
        assert_eq!(envelope.verdict.human_friendly, "Video not found. ");
        assert_eq!(envelope.api_version, CURRENT_API_VERSION);
    }

    #[test]
    fn rejects_target_above_current() {
        let err = validate_api_version(9).unwrap_err();
        assert!(matches!(err, EngineError::TargetApiVersionTooHigh { .. }));
    }

    #[test]
    fn rejects_target_below_oldest() {
        let err = validate_api_version(1).unwrap_err();
        assert!(matches!(err, EngineError::TargetApiVersionTooLow { .. }));
    }

    #[test]
    fn downgrade_to_v2_matches_documented_scenario() {
        let envelope = ResponseEnvelope::ok(
            "dQw4w9WgXcQ",
            vec![sample_result(true, vec![watch_link()])],
        );
        let coerced = coerce_envelope_to_version(&envelope, 2).unwrap();
        let key = &coerced["keys"][0];
        assert_eq!(key["capcount"], json!(1));
        assert_eq!(key["available"], json!("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(key["error"], json!(false));
        assert_eq!(coerced["api_version"], json!(2));
    }

    #[test]
    fn chained_downgrade_matches_direct_downgrade() {
        let envelope = ResponseEnvelope::ok(
            "dQw4w9WgXcQ",
            vec![sample_result(true, vec![watch_link()])],
        );
        let via_v4 = coerce_envelope_to_version(&envelope, 4).unwrap();
        let chained = coerce_value_to_version(via_v4, 2).unwrap();
        let direct = coerce_envelope_to_version(&envelope, 2).unwrap();
        assert_eq!(chained, direct);
    }

    #[test]
    fn empty_available_downgrades_to_null() {
        let envelope = ResponseEnvelope::ok("dQw4w9WgXcQ", vec![sample_result(false, vec![])]);
        let coerced = coerce_envelope_to_version(&envelope, 4).unwrap();
        assert_eq!(coerced["keys"][0]["available"], Value::Null);
        assert_eq!(coerced["keys"][0]["capcount"], json!(0));
    }

    #[test]
    fn stream_link_items_are_dropped_below_v5() {
        let item = StreamItem::Link(watch_link());
        assert!(coerce_stream_item(&item, 4).is_none());
        assert!(coerce_stream_item(&item, 5).is_some());
    }

    #[test]
    fn stream_end_sentinel_is_always_null() {
        assert_eq!(coerce_stream_item(&StreamItem::End, 2), Some(Value::Null));
        let serialized = serde_json::to_value(&StreamItem::End).unwrap();
        assert_eq!(serialized, Value::Null);
    }
}
