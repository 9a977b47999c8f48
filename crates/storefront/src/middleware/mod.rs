//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. `TraceLayer` (request span with method, uri and request id)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Rate limiting on `/api/auth` (governor)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::auth_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware, request_span};
pub use security_headers::security_headers_middleware;
