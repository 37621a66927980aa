//! HTTP transport: one-shot GET/POST execution and user-agent rotation.

pub mod agent;
pub mod http;

pub use agent::{random_user_agent, USER_AGENTS};
pub use http::{HttpCall, HttpReply, Method};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Other(String),
}
