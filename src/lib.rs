//! # multi-request
//!
//! 有限并发的批量 HTTP 请求执行器，逐个请求记录结果或错误。
//!
//! Bounded-concurrency batch HTTP runner. A [`MultiRequest`] holds a list of
//! [`Request`]s, dispatches each one on its own tokio task behind a counting
//! semaphore, and waits for all of them. Every request keeps its own result
//! bytes or error; the runner can also join all results in submission order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multi_request::{MultiRequest, Request, RunnerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut runner = MultiRequest::with_config(RunnerConfig::from_env().with_threads(8));
//!     runner.add_request(Request::get("https://example.com/status"));
//!     runner.add_request(
//!         Request::post("https://example.com/api", r#"{"q":1}"#)
//!             .with_content_type(multi_request::CONTENT_TYPE_JSON),
//!     );
//!
//!     let report = runner.run().await;
//!     println!("{}/{} succeeded", report.succeeded, report.dispatched);
//!     println!("{}", String::from_utf8_lossy(&runner.result()));
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Requests, the runner, and its configuration |
//! | [`transport`] | One-shot GET/POST execution and user-agent rotation |
//! | [`log_file`] | Buffered, lock-protected append-only log file |

pub mod batch;
pub mod log_file;
pub mod transport;

pub use batch::{
    Method, MultiRequest, Request, RequestStatus, RunReport, RunnerConfig, DEFAULT_THREADS,
    DEFAULT_TIMEOUT,
};
pub use log_file::LogFile;
pub use transport::http::{CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, CONTENT_TYPE_XML};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
