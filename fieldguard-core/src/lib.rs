// Core primitives for hosting fieldguard in a request pipeline
// Requests, responses, status codes, errors and the middleware chain

pub mod error;
pub mod http;
pub mod middleware;
pub mod status;

// Re-export commonly used types
pub use error::*;
pub use http::*;
pub use middleware::*;
pub use status::*;
