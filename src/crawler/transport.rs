//! HTTP transport for single fetch attempts
//!
//! A transport performs exactly one GET and reports what happened as an
//! [`Attempt`]. It never retries and never parses; both are the fetcher's job.
//! Two flavours exist because the runners use two concurrency models:
//! - [`Transport`] blocks the calling thread (sequential and pooled runners)
//! - [`AsyncTransport`] suspends at I/O (bounded runner)

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// What a single GET attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// A response arrived and its body was read
    Response { status_code: u16, body: String },

    /// The attempt ran past its timeout
    TimedOut,

    /// The request never got a response (DNS, refused, reset)
    ConnectionFailed(String),

    /// Anything else; not worth retrying
    Failed(String),
}

/// One blocking GET attempt
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Attempt;
}

/// One non-blocking GET attempt
pub trait AsyncTransport: Send + Sync + 'static {
    fn get(&self, url: &str, timeout: Duration) -> impl Future<Output = Attempt> + Send;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str, timeout: Duration) -> Attempt {
        (**self).get(url, timeout)
    }
}

impl<T: AsyncTransport> AsyncTransport for Arc<T> {
    fn get(&self, url: &str, timeout: Duration) -> impl Future<Output = Attempt> + Send {
        (**self).get(url, timeout)
    }
}

/// Blocking transport backed by `reqwest::blocking`
///
/// Must be created and dropped outside of an async runtime, e.g. on a plain
/// thread or inside `tokio::task::spawn_blocking`.
pub struct BlockingHttpTransport {
    client: reqwest::blocking::Client,
}

impl BlockingHttpTransport {
    /// Builds a transport that identifies itself with `user_agent`
    ///
    /// Redirects are followed using reqwest's default policy.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for BlockingHttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Attempt {
        let response = match self.client.get(url).timeout(timeout).send() {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status_code = response.status().as_u16();
        match response.text() {
            Ok(body) => Attempt::Response { status_code, body },
            Err(e) => classify_error(&e),
        }
    }
}

/// Async transport backed by `reqwest::Client`
///
/// The connection pool inside the client is bound to the runtime that first
/// uses it, so build one per bounded run.
pub struct AsyncHttpTransport {
    client: reqwest::Client,
}

impl AsyncHttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

impl AsyncTransport for AsyncHttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Attempt {
        let response = match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Attempt::Response { status_code, body },
            Err(e) => classify_error(&e),
        }
    }
}

/// Maps a reqwest error onto an attempt outcome
fn classify_error(error: &reqwest::Error) -> Attempt {
    if error.is_timeout() {
        Attempt::TimedOut
    } else if error.is_connect() || error.is_request() {
        Attempt::ConnectionFailed(error_chain(error))
    } else {
        Attempt::Failed(error_chain(error))
    }
}

/// Renders an error together with its sources, outermost first
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
