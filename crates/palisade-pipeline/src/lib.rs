//! # Palisade Pipeline
//!
//! The composable request pipeline: guards, pipes and interceptors around a
//! handler, with every failure normalized into one error envelope.
//!
//! ## Stages
//!
//! ```text
//! Request → Resolve → Guards → Pipes → Interceptors → Handler
//!                                                        ↓
//! Response / ErrorEnvelope ← Normalizer ← Interceptors ←─┘
//! ```
//!
//! | Stage        | Component                  | Purpose                                   |
//! |--------------|----------------------------|-------------------------------------------|
//! | Resolve      | [`MetadataRegistry`]       | Find the handler's declared components    |
//! | Guards       | [`Guard`], [`RolesGuard`]  | Admit or reject the request               |
//! | Pipes        | [`Pipe`]                   | Extract, transform and validate arguments |
//! | Interceptors | [`Interceptor`]            | Wrap the handler in onion order           |
//! | Normalizer   | [`ExceptionNormalizer`]    | Turn any error into an [`ErrorEnvelope`]  |
//!
//! Handlers are declared once with a [`HandlerDescriptor`], registered in a
//! [`MetadataRegistry`] and executed through a [`PipelineExecutor`].
//!
//! ## Example
//!
//! ```
//! use palisade_core::{Principal, RequestContext};
//! use palisade_pipeline::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let registry = MetadataRegistry::builder()
//!     .register(HandlerDescriptor::new("cats.admin").with_role("admin"))
//!     .unwrap()
//!     .build();
//!
//! let executor = PipelineExecutor::builder(registry)
//!     .global_interceptor(TransformInterceptor)
//!     .build();
//!
//! let request = RequestContext::new("GET", "/cats/guard/admin")
//!     .with_principal(Principal::new("u1").with_role("user"));
//! let denied = executor
//!     .execute(request, "cats.admin", |_| async { Ok(json!("admin area")) })
//!     .await
//!     .unwrap_err();
//! assert_eq!(denied.status_code, 403);
//!
//! let request = RequestContext::new("GET", "/cats/guard/admin")
//!     .with_principal(Principal::new("u2").with_role("admin"));
//! let allowed = executor
//!     .execute(request, "cats.admin", |_| async { Ok(json!("admin area")) })
//!     .await
//!     .unwrap();
//! assert_eq!(allowed, json!({ "data": "admin area" }));
//! # });
//! ```
//!
//! [`ErrorEnvelope`]: palisade_core::ErrorEnvelope

#![doc(html_root_url = "https://docs.rs/palisade-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod descriptor;
pub mod executor;
pub mod guard;
pub mod guards;
pub mod interceptor;
pub mod interceptors;
pub mod normalizer;
pub mod pipe;
pub mod pipes;
pub mod registry;

// Re-export main types at crate root
pub use context::ExecutionContext;
pub use descriptor::{ArgumentMetadata, HandlerDescriptor, ParamPipeSpec, ParamSource};
pub use executor::{PipelineExecutor, PipelineExecutorBuilder};
pub use guard::{FnGuard, Guard, GuardEvaluator};
pub use guards::RolesGuard;
pub use interceptor::{BoxFuture, Interceptor, Next};
pub use normalizer::{ErrorPolicy, ExceptionFilter, ExceptionNormalizer};
pub use pipe::{BoundParameters, FnPipe, Pipe, PipeChain};
pub use registry::{MetadataRegistry, RegistryBuilder};

/// Everything needed to declare and execute handlers.
pub mod prelude {
    pub use crate::context::ExecutionContext;
    pub use crate::descriptor::{ArgumentMetadata, HandlerDescriptor, ParamPipeSpec, ParamSource};
    pub use crate::executor::PipelineExecutor;
    pub use crate::guard::{FnGuard, Guard};
    pub use crate::guards::{AuthGuard, BearerTokenGuard, RolesGuard};
    pub use crate::interceptor::{BoxFuture, Interceptor, Next};
    pub use crate::interceptors::{
        CacheInterceptor, ExceptionInterceptor, LoggingInterceptor, TimeoutInterceptor,
        TransformInterceptor,
    };
    pub use crate::normalizer::ExceptionFilter;
    pub use crate::pipe::{BoundParameters, FnPipe, Pipe};
    pub use crate::pipes::{
        DefaultValuePipe, ParseArrayPipe, ParseBoolPipe, ParseFloatPipe, ParseIntPipe,
        ParseUuidPipe, ToLowerCasePipe, TrimPipe, ValidationPipe,
    };
    pub use crate::registry::MetadataRegistry;
}
