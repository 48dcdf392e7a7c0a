//! # Palisade
//!
//! **A composable request pipeline for Rust services**
//!
//! Palisade runs every request through the same ordered stages before and
//! after the handler:
//!
//! - 🛡️ **Guards** – admit or reject the request, including role requirements
//! - 🔧 **Pipes** – extract, convert and validate each handler argument
//! - 🧅 **Interceptors** – wrap the handler for logging, caching, timeouts and more
//! - 🚨 **Exception normalization** – every failure becomes one error envelope
//!
//! ## Quick Start
//!
//! ```
//! use palisade::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = MetadataRegistry::builder()
//!     .register(
//!         HandlerDescriptor::new("cats.findOne")
//!             .with_param(ParamPipeSpec::param("id").pipe(ParseIntPipe))
//!             .with_interceptor(TransformInterceptor),
//!     )?
//!     .build();
//!
//! let executor = PipelineExecutor::builder(registry)
//!     .global_interceptor(LoggingInterceptor)
//!     .build();
//!
//! let request = RequestContext::new("GET", "/cats/1").with_route_param("id", "1");
//! let response = executor
//!     .execute(request, "cats.findOne", |params| async move {
//!         params.parse::<i64>(0).map(|id| json!({ "id": id, "name": "Tom" }))
//!     })
//!     .await;
//!
//! assert_eq!(response.unwrap(), json!({ "data": { "id": 1, "name": "Tom" } }));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Resolve → Guards → Pipes → Interceptors → Handler
//!                                                        ↓
//! Response / ErrorEnvelope ← Normalizer ← Interceptors ←─┘
//! ```

#![doc(html_root_url = "https://docs.rs/palisade/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bootstrap;

// Re-export core types
pub use palisade_core as core;

// Re-export pipeline types
pub use palisade_pipeline as pipeline;

// Re-export configuration types
pub use palisade_config as config;

// Re-export telemetry types
pub use palisade_telemetry as telemetry;

pub use bootstrap::{executor_builder, init_telemetry, load_config, load_config_from, BootstrapError};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use palisade::prelude::*;
/// ```
pub mod prelude {
    pub use palisade_core::{
        ErrorCategory, ErrorEnvelope, PipelineError, PipelineResult, Principal, RequestContext,
        RequestId, Value,
    };

    pub use palisade_pipeline::prelude::*;
    pub use palisade_pipeline::{ExceptionFilter, ExceptionNormalizer, PipelineExecutorBuilder};

    pub use palisade_config::{ConfigLoader, PalisadeConfig};
}
