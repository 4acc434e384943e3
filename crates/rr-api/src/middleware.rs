//! rusty-reader/crates/rr-api/src/middleware.rs Middleware
//!
//! Request logging and response hardening shared by every route.

use actix_web::middleware::{DefaultHeaders, Logger};

/// Access log line per request:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}
