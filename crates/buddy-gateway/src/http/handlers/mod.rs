//! HTTP request handlers.

mod auth;
mod chat;
mod health;
mod upload;

pub use auth::{login, signup};
pub use chat::chat;
pub use health::health_check;
pub use upload::{upload_job_description, upload_resume};
