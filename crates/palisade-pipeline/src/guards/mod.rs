//! Built-in guards.
//!
//! | Guard               | Admits the request when                              |
//! |---------------------|------------------------------------------------------|
//! | [`AuthGuard`]       | a principal is attached                              |
//! | [`BearerTokenGuard`]| the `authorization` header is `<scheme> <token>`     |
//! | [`RolesGuard`]      | the principal holds one of the handler's roles       |
//!
//! [`RolesGuard`] always runs last for every handler, so declaring it
//! explicitly is only needed to move it earlier in the order.

pub mod auth;
pub mod bearer;
pub mod roles;

pub use auth::AuthGuard;
pub use bearer::BearerTokenGuard;
pub use roles::RolesGuard;

/// Message carried by authentication failures raised by built-in guards.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message carried by the error raised when a guard rejects a request.
pub const FORBIDDEN_MESSAGE: &str = "Forbidden resource";
