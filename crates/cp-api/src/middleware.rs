//! citypress/crates/cp-api/src/middleware.rs
//!
//! Standard middleware for logging and cross-origin policy.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Returns the standard access logger for the Citypress API.
pub fn standard_middleware() -> Logger {
    // The 'default' logger outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing).
// The site frontend and this API live on different subdomains.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .max_age(3600)
}
