//! HTTP server module exposing the admission endpoints.

mod handlers;
mod server;

pub use handlers::{router, CLIENT_ID_HEADER};
pub use server::HttpServer;
