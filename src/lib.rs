//! Talentgate - request-gating and response-reuse gateway for a
//! recruiting-services chat assistant
//!
//! The pipeline per request: IP gate, content filter, analytics recording,
//! response-cache lookup, and only on a miss the external assistant call
//! followed by reply post-processing and a cache store.

pub mod analytics;
pub mod assistant;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod postprocess;
pub mod store;
pub mod telemetry;
