//! Built-in interceptors.
//!
//! | Interceptor              | Pre-phase                 | Post-phase                          |
//! |--------------------------|---------------------------|-------------------------------------|
//! | [`LoggingInterceptor`]   | log start, record instant | log elapsed time                    |
//! | [`TransformInterceptor`] | -                         | wrap response as `{"data": ...}`    |
//! | [`CacheInterceptor`]     | return cached value       | store successful response           |
//! | [`TimeoutInterceptor`]   | start deadline            | raise timeout if deadline passed    |
//! | [`ExceptionInterceptor`] | -                         | convert error into an envelope      |

pub mod cache;
pub mod exception;
pub mod logging;
pub mod timeout;
pub mod transform;

pub use cache::CacheInterceptor;
pub use exception::ExceptionInterceptor;
pub use logging::LoggingInterceptor;
pub use timeout::TimeoutInterceptor;
pub use transform::TransformInterceptor;
