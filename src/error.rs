//! Error types shared by the runner, transport and log file.

use crate::transport::TransportError;
use thiserror::Error;

/// Where a configuration or runtime error came from.
///
/// Rendered after the message as `(field: .., details: .., source: ..)`,
/// skipping parts that are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// `env.MULTI_REQUEST_THREADS`, `requests[3]`, ...
    pub field_path: Option<String>,
    /// Offending value or extra detail.
    pub details: Option<String>,
    /// Component that raised it: `runner`, `runner_config`.
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the batch runner.
///
/// Every variant except `Configuration` and `Io` is recorded on the request
/// that produced it; none of them abort the runner or sibling requests.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Missing body: POST to {url} requires a non-empty body")]
    MissingBody { url: String },

    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Response body read error: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let parts: Vec<String> = [
        ("field", &ctx.field_path),
        ("details", &ctx.details),
        ("source", &ctx.source),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
    .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the call gave up because its timeout elapsed, either while
    /// waiting for the response head or while reading the body.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(TransportError::Timeout(_)) => true,
            Error::Transport(TransportError::Http(e)) | Error::BodyRead(e) => e.is_timeout(),
            _ => false,
        }
    }
}
