//! 批量请求模块：在有限并发下并行执行 GET/POST 请求并聚合结果。
//!
//! # Batch Request Module
//!
//! Runs a batch of HTTP requests in parallel, bounded by a slot limit, and
//! keeps each request's outcome on the request itself.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Request`] | One call's configuration plus its result or error |
//! | [`RequestStatus`] | `Created -> Dispatched -> {Succeeded, Failed}` |
//! | [`MultiRequest`] | Owns the batch and drives bounded-concurrency execution |
//! | [`RunnerConfig`] | Slot limit and default timeout, env-overridable |
//! | [`RunReport`] | Per-run success/failure summary |
//!
//! ## Example
//!
//! ```rust,no_run
//! use multi_request::batch::{MultiRequest, Request};
//!
//! # async fn demo() {
//! let mut runner = MultiRequest::new().with_threads(4);
//! runner.add_request(Request::get("https://example.com/a"));
//! runner.add_request(Request::post("https://example.com/b", "k=v"));
//!
//! let report = runner.run().await;
//! for (index, err) in runner.failures() {
//!     eprintln!("request {index} failed: {err}");
//! }
//! let joined = runner.result();
//! # let _ = (report, joined);
//! # }
//! ```
//!
//! ## Failure isolation
//!
//! Errors never abort the runner or sibling requests. The aggregated
//! [`MultiRequest::result`] does not carry them: a failed request shows up as
//! an empty line, so inspect [`Request::error`] or [`MultiRequest::failures`].

mod request;
mod runner;

pub use crate::transport::Method;
pub use request::{Request, RequestStatus, DEFAULT_TIMEOUT};
pub use runner::{
    MultiRequest, RunReport, RunnerConfig, DEFAULT_THREADS, THREADS_ENV, TIMEOUT_ENV,
};
