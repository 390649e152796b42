//! Interview Buddy Gateway
//!
//! A thin HTTP proxy in front of the backend. It accepts the front-end's
//! JSON/multipart requests, reshapes them into what the backend expects, and
//! flattens backend errors into `{ "message": ... }` bodies.

pub mod config;
pub mod error;
pub mod http;
pub mod state;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::{create_router, serve};
pub use state::GatewayState;
