//! Boundary to the downstream certificate service.
//!
//! The orchestrator only ever sees an opaque error from here: transport
//! failures, non-2xx responses and undecodable bodies all collapse into
//! `MutationError`, whose text ends up in outcome records and log lines but
//! is never branched on.

pub mod http;

use thiserror::Error;

/// Opaque failure of a single item mutation.
#[derive(Debug, Error)]
#[error("certificate request failed: {0}")]
pub struct MutationError(#[from] reqwest::Error);
