//! A concurrent multi-service probe engine for locating archived copies of
//! YouTube videos (§1). This crate is the core: probe orchestration, the
//! per-service result contract, the TTL cache, the cooldown gate, and the
//! versioned response envelopes. The HTTP surface, CLI, and config loader
//! that sit in front of it are out of scope (§1) and live in separate
//! crates that depend on this one.

pub mod cache;
pub mod config;
pub mod cooldown;
pub mod envelope;
pub mod error;
mod experiment;
pub mod http;
pub mod id;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod probe;
mod services;

pub use config::Config;
pub use envelope::{
    CURRENT_API_VERSION, OLDEST_API_VERSION, EnvelopeStatus, ResponseEnvelope, StreamItem,
    coerce_envelope_to_version, coerce_stream_item, coerce_value_to_version, validate_api_version,
};
pub use error::{EngineError, ProbeError};
pub use id::VideoId;
pub use model::{Link, LinkContains, ProbeResult, Verdict};
pub use orchestrator::Engine;
