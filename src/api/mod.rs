//! HTTP API
//!
//! JSON endpoints under `/api/`, served by axum over a shared `AppContext`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::build_router;
pub use server::serve;
