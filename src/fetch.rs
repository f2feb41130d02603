//! Record retrieval
//!
//! One blocking read of the whole body, then one parse. Supported sources:
//! - `http://` / `https://` URLs (blocking reqwest client, bounded timeout)
//! - `file://` URIs and bare filesystem paths
//!
//! A [`CancelToken`] moves the read onto a worker thread so the caller can
//! walk away from a slow source without waiting for the timeout.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use crate::consts::{CANCEL_POLL_INTERVAL, CONNECT_TIMEOUT, DEFAULT_FETCH_TIMEOUT};
use crate::error::{Error, Result};
use crate::record::MathRecord;

/// Shared cancellation flag for an in-flight fetch
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a source URI points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Http(String),
    File(PathBuf),
}

impl SourceKind {
    pub fn parse(uri: &str) -> Self {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            SourceKind::Http(uri.to_string())
        } else if let Some(path) = uri.strip_prefix("file://") {
            SourceKind::File(PathBuf::from(path))
        } else {
            SourceKind::File(PathBuf::from(uri))
        }
    }

    /// Read the full body
    fn read(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>> {
        match self {
            SourceKind::Http(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(CONNECT_TIMEOUT.min(timeout))
                    .build()
                    .map_err(|e| Error::transport(uri, describe_http_error(&e)))?;

                let response = client
                    .get(url)
                    .send()
                    .map_err(|e| Error::transport(uri, describe_http_error(&e)))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::transport(uri, format!("HTTP status {status}")));
                }
                let body = response
                    .bytes()
                    .map_err(|e| Error::transport(uri, describe_http_error(&e)))?;
                Ok(body.to_vec())
            }
            SourceKind::File(path) => std::fs::read(path).map_err(|e| Error::transport(uri, e)),
        }
    }
}

/// reqwest's top-level message plus its cause chain
fn describe_http_error(err: &reqwest::Error) -> String {
    let mut reason = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        reason.push_str(": ");
        reason.push_str(&inner.to_string());
        cause = inner.source();
    }
    reason
}

/// Parse a response body into records
pub fn parse_records(body: &[u8]) -> Result<Vec<MathRecord>> {
    Ok(serde_json::from_slice(body)?)
}

/// Retrieves and parses record lists
#[derive(Debug, Clone)]
pub struct Fetcher {
    timeout: Duration,
    cancel: Option<CancelToken>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            cancel: None,
        }
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fetch and parse the full record list at `uri`
    pub fn fetch(&self, uri: &str) -> Result<Vec<MathRecord>> {
        let source = SourceKind::parse(uri);
        log::info!("Fetching records from {uri}");

        let body = match &self.cancel {
            None => source.read(uri, self.timeout)?,
            Some(token) => self.read_cancellable(source, uri, token)?,
        };

        let records = parse_records(&body)?;
        log::info!("Fetched {} records ({} bytes)", records.len(), body.len());
        Ok(records)
    }

    fn read_cancellable(&self, source: SourceKind, uri: &str, token: &CancelToken) -> Result<Vec<u8>> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let (tx, rx) = mpsc::channel();
        let worker_uri = uri.to_string();
        let timeout = self.timeout;
        std::thread::Builder::new()
            .name("record-fetch".to_string())
            .spawn(move || {
                // Receiver is gone if the caller cancelled
                let _ = tx.send(source.read(&worker_uri, timeout));
            })
            .map_err(|e| Error::transport(uri, e))?;

        loop {
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(result) => return result,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if token.is_cancelled() {
                        log::warn!("Fetch from {uri} cancelled");
                        return Err(Error::Cancelled);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(Error::transport(uri, "fetch worker exited without a result"));
                }
            }
        }
    }
}

/// Fetch with default settings
pub fn fetch(uri: &str) -> Result<Vec<MathRecord>> {
    Fetcher::new().fetch(uri)
}
