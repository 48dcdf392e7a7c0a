//! Handler descriptors.
//!
//! A [`HandlerDescriptor`] is everything the pipeline needs to know about a
//! handler before running it: the roles it requires, its guards, how each of
//! its parameters is extracted and piped, the interceptors wrapped around it,
//! and an optional deadline. Descriptors are assembled once at startup, handed
//! to the [`MetadataRegistry`](crate::MetadataRegistry), and shared read-only by
//! every request that hits the handler.
//!
//! # Example
//!
//! ```
//! use palisade_pipeline::descriptor::{HandlerDescriptor, ParamPipeSpec};
//! use palisade_pipeline::guards::AuthGuard;
//! use palisade_pipeline::interceptors::LoggingInterceptor;
//! use palisade_pipeline::pipes::ParseIntPipe;
//!
//! let descriptor = HandlerDescriptor::new("cats.findOne")
//!     .with_roles(["admin", "user"])
//!     .with_guard(AuthGuard)
//!     .with_param(ParamPipeSpec::param("id").pipe(ParseIntPipe))
//!     .with_interceptor(LoggingInterceptor);
//!
//! assert_eq!(descriptor.id(), "cats.findOne");
//! assert_eq!(descriptor.params().len(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::guard::Guard;
use crate::interceptor::Interceptor;
use crate::pipe::Pipe;

/// Where a handler parameter is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// The whole request body.
    Body,
    /// A named route parameter.
    Param(String),
    /// A named query parameter. Repeated keys bind as an array.
    Query(String),
    /// The attached principal, or a single field of it.
    Principal {
        /// `id`, `roles`, or a claim key. `None` binds the whole principal.
        field: Option<String>,
    },
}

impl ParamSource {
    /// Short kind label: `body`, `param`, `query`, or `principal`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Param(_) => "param",
            Self::Query(_) => "query",
            Self::Principal { .. } => "principal",
        }
    }

    /// The parameter name, if the source has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Body => None,
            Self::Param(name) | Self::Query(name) => Some(name),
            Self::Principal { field } => field.as_deref(),
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}:{}", self.kind(), name),
            None => f.write_str(self.kind()),
        }
    }
}

/// What a pipe knows about the parameter it is transforming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMetadata {
    /// Position of the parameter in the handler signature.
    pub index: usize,
    /// Where the raw value came from.
    pub source: ParamSource,
}

/// Extraction source and pipe chain for one handler parameter.
#[derive(Clone)]
pub struct ParamPipeSpec {
    source: ParamSource,
    pipes: Vec<Arc<dyn Pipe>>,
}

impl ParamPipeSpec {
    /// Creates a spec with no pipes; the raw value passes through unchanged.
    #[must_use]
    pub fn new(source: ParamSource) -> Self {
        Self {
            source,
            pipes: Vec::new(),
        }
    }

    /// Binds the request body.
    #[must_use]
    pub fn body() -> Self {
        Self::new(ParamSource::Body)
    }

    /// Binds a route parameter.
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::new(ParamSource::Param(name.into()))
    }

    /// Binds a query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(ParamSource::Query(name.into()))
    }

    /// Binds the whole principal.
    #[must_use]
    pub fn principal() -> Self {
        Self::new(ParamSource::Principal { field: None })
    }

    /// Binds one field of the principal.
    #[must_use]
    pub fn principal_field(field: impl Into<String>) -> Self {
        Self::new(ParamSource::Principal {
            field: Some(field.into()),
        })
    }

    /// Appends a pipe. Pipes run in the order they are appended.
    #[must_use]
    pub fn pipe<P: Pipe>(mut self, pipe: P) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    /// Appends a pipe instance shared with other specs.
    #[must_use]
    pub fn shared_pipe(mut self, pipe: Arc<dyn Pipe>) -> Self {
        self.pipes.push(pipe);
        self
    }

    /// Returns the extraction source.
    #[must_use]
    pub const fn source(&self) -> &ParamSource {
        &self.source
    }

    /// Returns the pipes in application order.
    #[must_use]
    pub fn pipes(&self) -> &[Arc<dyn Pipe>] {
        &self.pipes
    }
}

impl fmt::Debug for ParamPipeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamPipeSpec")
            .field("source", &self.source)
            .field(
                "pipes",
                &self.pipes.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Immutable metadata describing one handler.
#[derive(Clone)]
pub struct HandlerDescriptor {
    id: String,
    roles: BTreeSet<String>,
    guards: Vec<Arc<dyn Guard>>,
    params: Vec<ParamPipeSpec>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    timeout: Option<Duration>,
}

impl HandlerDescriptor {
    /// Creates a descriptor with no requirements.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
            guards: Vec::new(),
            params: Vec::new(),
            interceptors: Vec::new(),
            timeout: None,
        }
    }

    /// Adds a required role. A principal holding any one of the required
    /// roles is admitted.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds several required roles.
    #[must_use]
    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Appends a guard.
    #[must_use]
    pub fn with_guard<G: Guard>(mut self, guard: G) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Appends the next positional parameter.
    #[must_use]
    pub fn with_param(mut self, param: ParamPipeSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Appends an interceptor. The first one appended is the outermost.
    #[must_use]
    pub fn with_interceptor<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an interceptor instance shared with other handlers or with
    /// the caller, for example a cache the caller wants to invalidate.
    #[must_use]
    pub fn with_shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Declares a deadline for the handler.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the handler identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the required roles. Empty means no restriction.
    #[must_use]
    pub const fn required_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Returns the handler's own guards in evaluation order.
    #[must_use]
    pub fn guards(&self) -> &[Arc<dyn Guard>] {
        &self.guards
    }

    /// Returns the parameter specs in positional order.
    #[must_use]
    pub fn params(&self) -> &[ParamPipeSpec] {
        &self.params
    }

    /// Returns the handler's own interceptors, outermost first.
    #[must_use]
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// Returns the declared deadline, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("roles", &self.roles)
            .field(
                "guards",
                &self.guards.iter().map(|g| g.name()).collect::<Vec<_>>(),
            )
            .field("params", &self.params)
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}
