//! Batch runner.

use super::request::{Request, RequestStatus, DEFAULT_TIMEOUT};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Concurrency used when the configured limit is unset (zero).
pub const DEFAULT_THREADS: usize = 1;

pub const THREADS_ENV: &str = "MULTI_REQUEST_THREADS";
pub const TIMEOUT_ENV: &str = "MULTI_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum requests executing their network call at once. Zero means unset.
    pub threads: usize,
    /// Applied to requests whose own timeout is zero.
    pub default_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Slot count a run is gated by: `threads`, or 1 when unset, capped at
    /// the semaphore's permit limit.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            DEFAULT_THREADS
        } else {
            self.threads.min(Semaphore::MAX_PERMITS)
        }
    }

    /// Defaults overridden by `MULTI_REQUEST_THREADS` and
    /// `MULTI_REQUEST_TIMEOUT_SECS`. Unparsable values are logged and skipped.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match read_env::<i64>(THREADS_ENV) {
            Ok(Some(threads)) => config.threads = threads.max(0) as usize,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ignoring environment override"),
        }
        match read_env::<u64>(TIMEOUT_ENV) {
            Ok(Some(secs)) => config.default_timeout = Duration::from_secs(secs),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ignoring environment override"),
        }
        config
    }

    /// Like [`RunnerConfig::from_env`], but an unparsable value is an error.
    pub fn try_from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(threads) = read_env::<i64>(THREADS_ENV)? {
            config.threads = threads.max(0) as usize;
        }
        if let Some(secs) = read_env::<u64>(TIMEOUT_ENV)? {
            config.default_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn read_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    raw.trim().parse::<T>().map(Some).map_err(|_| {
        Error::configuration_with_context(
            "environment value is not a valid number",
            ErrorContext::new()
                .with_field_path(format!("env.{key}"))
                .with_details(format!("got '{raw}'"))
                .with_source("runner_config"),
        )
    })
}

/// Summary of one [`MultiRequest::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Slot count the run was gated by.
    pub concurrency: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
    pub fn success_rate(&self) -> f64 {
        if self.dispatched == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.dispatched as f64
        }
    }
}

/// Owns a batch of requests and executes them with bounded parallelism.
///
/// Requests keep their insertion order; completion order is never exposed
/// except through each request's own outcome.
#[derive(Debug, Default)]
pub struct MultiRequest {
    requests: Vec<Request>,
    config: RunnerConfig,
}

impl MultiRequest {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            requests: Vec::new(),
            config,
        }
    }
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
    pub fn set_threads(&mut self, threads: usize) {
        self.config.threads = threads;
    }

    pub fn add_request(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// Drop every request; configuration is untouched.
    pub fn reset(&mut self) {
        self.requests.clear();
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
    pub fn requests_mut(&mut self) -> &mut [Request] {
        &mut self.requests
    }
    pub fn request(&self, index: usize) -> Option<&Request> {
        self.requests.get(index)
    }

    /// Execute every held request and wait for all of them.
    ///
    /// A fresh slot pool of `effective_threads()` permits is built on each
    /// call. The dispatch loop takes a permit before spawning each worker, so
    /// it stalls while all slots are busy; the worker releases its permit once
    /// its call has finished, whatever the outcome. Running again re-dispatches
    /// every request and replaces earlier outcomes.
    pub async fn run(&mut self) -> RunReport {
        if self.requests.is_empty() {
            return RunReport::default();
        }

        let start = Instant::now();
        let concurrency = self.config.effective_threads();
        let default_timeout = self.config.default_timeout;
        let slots = Arc::new(Semaphore::new(concurrency));
        let mut workers = Vec::with_capacity(self.requests.len());

        for (index, request) in self.requests.iter_mut().enumerate() {
            let call = request.prepare_dispatch(default_timeout);
            let permit = match slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    request.fail(Error::runtime_with_context(
                        "dispatch slot pool closed",
                        worker_context(index),
                    ));
                    continue;
                }
            };
            debug!(
                index,
                method = call.method.as_str(),
                url = call.url.as_str(),
                "dispatching request"
            );
            let handle = tokio::spawn(async move {
                let outcome = call.execute().await;
                drop(permit);
                outcome
            });
            workers.push((index, handle));
        }

        for (index, handle) in workers {
            let outcome = handle.await.unwrap_or_else(|e| {
                Err(Error::runtime_with_context(
                    format!("worker task failed: {e}"),
                    worker_context(index),
                ))
            });
            let request = &mut self.requests[index];
            if let Err(ref e) = outcome {
                warn!(index, url = request.url(), error = %e, "request failed");
            }
            request.complete(outcome);
        }

        let report = self.report(concurrency, start.elapsed());
        info!(
            dispatched = report.dispatched,
            succeeded = report.succeeded,
            failed = report.failed,
            concurrency = report.concurrency,
            duration_ms = report.elapsed.as_millis(),
            "multi-request run finished"
        );
        report
    }

    fn report(&self, concurrency: usize, elapsed: Duration) -> RunReport {
        let count = |status: RequestStatus| {
            self.requests
                .iter()
                .filter(|r| r.status() == status)
                .count()
        };
        let succeeded = count(RequestStatus::Succeeded);
        let failed = count(RequestStatus::Failed);
        RunReport {
            dispatched: succeeded + failed,
            succeeded,
            failed,
            concurrency,
            elapsed,
        }
    }

    /// Aggregated payload in submission order.
    ///
    /// One request yields its raw bytes. Several yield each result's bytes,
    /// unchanged, followed by a newline; a failed request contributes an empty line, so
    /// check [`MultiRequest::failures`] to tell failures from empty bodies.
    pub fn result(&self) -> Vec<u8> {
        match self.requests.as_slice() {
            [] => Vec::new(),
            [only] => only.result().to_vec(),
            many => {
                let mut joined = Vec::new();
                for request in many {
                    joined.extend_from_slice(request.result());
                    joined.push(b'\n');
                }
                joined
            }
        }
    }

    /// Requests whose last run recorded an error, with their submission index.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Error)> + '_ {
        self.requests
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.error().map(|e| (i, e)))
    }
}

fn worker_context(index: usize) -> ErrorContext {
    ErrorContext::new()
        .with_field_path(format!("requests[{index}]"))
        .with_source("runner")
}
