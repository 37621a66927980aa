//! One-shot GET/POST execution over a per-call reqwest client.

use crate::transport::TransportError;
use crate::{Error, Result};
use bytes::Bytes;
use reqwest::header::{CONNECTION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default content type for POST bodies when the caller sets none.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";
pub const CONTENT_TYPE_XML: &str = "text/xml; charset=utf-8";

/// HTTP methods the runner knows how to dispatch.
///
/// The set is closed: text that names anything else fails to parse with
/// [`Error::UnsupportedMethod`], so an unknown method can never reach a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Owned snapshot of everything one network call needs.
///
/// Built by the runner from a `Request` right before dispatch and moved into
/// the worker task, so workers never touch the runner's request list.
#[derive(Debug, Clone)]
pub struct HttpCall {
    pub method: Method,
    pub url: String,
    pub body: String,
    pub content_type: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

/// What came back from a completed call. Any status code counts as a reply.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

impl HttpCall {
    /// Run the call once. No retry, no partial result: the first failure wins.
    pub async fn execute(self) -> Result<HttpReply> {
        match self.method {
            Method::Get => self.execute_get().await,
            Method::Post => self.execute_post().await,
        }
    }

    async fn execute_get(self) -> Result<HttpReply> {
        let url = self.parse_url()?;
        let request = self
            .client()?
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONNECTION, "close");
        self.send(request).await
    }

    async fn execute_post(self) -> Result<HttpReply> {
        if self.body.is_empty() {
            return Err(Error::MissingBody { url: self.url });
        }
        let url = self.parse_url()?;
        let content_type = self
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(CONTENT_TYPE_FORM);
        let request = self
            .client()?
            .post(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONTENT_TYPE, content_type)
            .header(CONNECTION, "close")
            .body(self.body.clone());
        self.send(request).await
    }

    fn parse_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|source| Error::InvalidUrl {
            url: self.url.clone(),
            source,
        })
    }

    // One client per call: the timeout belongs to the request, and idle
    // connections are never kept for reuse.
    fn client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpReply> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport(TransportError::Timeout(self.timeout))
            } else {
                Error::Transport(TransportError::Http(e))
            }
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::BodyRead)?;
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: Method, url: &str, body: &str) -> HttpCall {
        HttpCall {
            method,
            url: url.to_string(),
            body: body.to_string(),
            content_type: None,
            user_agent: "test-agent".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(" Post ".parse::<Method>().unwrap(), Method::Post);
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_method_parse_rejects_unknown() {
        let err = "PUT".parse::<Method>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod(ref m) if m == "PUT"));
    }

    #[test]
    fn test_method_serde_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&Method::Get).unwrap(), "\"GET\"");
        let m: Method = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(m, Method::Post);
    }

    #[tokio::test]
    async fn test_post_without_body_fails_before_io() {
        // Port 9 (discard) would refuse or hang; the body check must come first.
        let err = call(Method::Post, "http://127.0.0.1:9/submit", "")
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingBody { .. }));
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_construction_error() {
        let err = call(Method::Get, "not a url", "").execute().await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
