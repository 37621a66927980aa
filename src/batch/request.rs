//! A single HTTP call descriptor and the outcome it captured.

use crate::transport::{random_user_agent, HttpCall, HttpReply, Method};
use crate::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Applied to requests that reach dispatch with a zero timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a request inside a runner.
///
/// `Created -> Dispatched -> {Succeeded | Failed}`. A new run moves finished
/// requests back to `Dispatched`, dropping the previous outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Created,
    Dispatched,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RequestStatus::Succeeded | RequestStatus::Failed)
    }
}

/// One HTTP call's configuration plus its eventual outcome.
///
/// After a run, exactly one of [`Request::error`] or the stored result is set.
#[derive(Debug)]
pub struct Request {
    url: String,
    method: Method,
    body: String,
    content_type: Option<String>,
    user_agent: Option<String>,
    timeout: Duration,
    result: Option<Bytes>,
    http_status: Option<u16>,
    error: Option<Error>,
    status: RequestStatus,
}

impl Request {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            body: String::new(),
            content_type: None,
            user_agent: None,
            timeout: Duration::ZERO,
            result: None,
            http_status: None,
            error: None,
            status: RequestStatus::Created,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, Method::Get)
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(url, Method::Post).with_body(body)
    }

    /// Build a request from a textual method name.
    ///
    /// Fails with [`Error::UnsupportedMethod`] for anything other than GET or
    /// POST, so unknown methods are rejected here instead of being skipped
    /// silently at run time.
    pub fn parse(url: impl Into<String>, method: &str) -> Result<Self> {
        Ok(Self::new(url, method.parse()?))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// A zero duration means "unset" and is replaced at dispatch time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Status code of the response, when one was received. Non-2xx codes are
    /// not errors; the body is stored either way.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The stored payload, or an empty slice if none was ever stored.
    pub fn result(&self) -> &[u8] {
        self.result.as_deref().unwrap_or_default()
    }

    pub fn set_result(&mut self, result: impl Into<Bytes>) {
        self.result = Some(result.into());
    }

    /// Draw a user agent from the rotation pool unless one is already set.
    pub fn assign_agent_if_absent(&mut self) -> &str {
        self.user_agent
            .get_or_insert_with(|| random_user_agent().to_string())
            .as_str()
    }

    /// Move to `Dispatched` and snapshot the call for a worker.
    ///
    /// Clears any outcome left by a previous run so the new one is the only
    /// one visible afterwards.
    pub(crate) fn prepare_dispatch(&mut self, default_timeout: Duration) -> HttpCall {
        if self.timeout.is_zero() {
            self.timeout = if default_timeout.is_zero() {
                DEFAULT_TIMEOUT
            } else {
                default_timeout
            };
        }
        let user_agent = self.assign_agent_if_absent().to_string();
        self.result = None;
        self.http_status = None;
        self.error = None;
        self.status = RequestStatus::Dispatched;
        HttpCall {
            method: self.method,
            url: self.url.clone(),
            body: self.body.clone(),
            content_type: self.content_type.clone(),
            user_agent,
            timeout: self.timeout,
        }
    }

    pub(crate) fn complete(&mut self, outcome: Result<HttpReply>) {
        match outcome {
            Ok(reply) => {
                self.http_status = Some(reply.status);
                self.result = Some(reply.body);
                self.status = RequestStatus::Succeeded;
            }
            Err(e) => self.fail(e),
        }
    }

    pub(crate) fn fail(&mut self, error: Error) {
        self.error = Some(error);
        self.status = RequestStatus::Failed;
    }
}
