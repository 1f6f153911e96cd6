//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that exposes the current snapshot.

mod handlers;
mod server;

pub use handlers::ApiError;
pub use server::HttpServer;
