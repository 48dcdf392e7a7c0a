//! # Palisade Core
//!
//! Core types shared by every Palisade crate.
//!
//! - [`RequestContext`] - Per-request state handed to the pipeline by the transport layer
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Principal`] - Authenticated caller and its role set
//! - [`PipelineError`] - The error taxonomy every pipeline stage reports through
//! - [`ErrorEnvelope`] - The structured error a caller receives on failure

#![doc(html_root_url = "https://docs.rs/palisade-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod principal;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, ErrorEnvelope, PipelineError, PipelineResult};
pub use principal::Principal;

/// Opaque response and parameter value flowing through the pipeline.
pub type Value = serde_json::Value;
