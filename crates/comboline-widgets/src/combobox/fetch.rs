//! Remote item lookup.
//!
//! A [`Fetcher`] turns a request URL into a JSON document. The combobox
//! keeps at most one lookup in flight through a [`FetchSlot`]: starting a new
//! one cancels the previous token and bumps the generation, and completions
//! carrying an older generation are dropped on arrival.

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// Why a remote lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or unreadable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server answered with status {0}")]
    Status(u16),

    /// The body is not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of remote items.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch `url` and parse the body as JSON.
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<serde_json::Value, FetchError>>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<serde_json::Value, FetchError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let response = client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        })
    }
}

/// The endpoint followed by the URL-encoded text.
pub fn request_url(endpoint: &str, text: &str) -> String {
    format!("{endpoint}{}", urlencoding::encode(text))
}

/// Bookkeeping for the single in-flight lookup.
#[derive(Debug, Default)]
pub(crate) struct FetchSlot {
    generation: u64,
    pending: Option<CancellationToken>,
}

impl FetchSlot {
    /// Cancel whatever is pending and hand out a fresh generation and token.
    pub(crate) fn begin(&mut self) -> (u64, CancellationToken) {
        self.cancel();
        self.generation += 1;
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        (self.generation, token)
    }

    /// Mark `generation` complete. Returns false for a superseded lookup.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = None;
        true
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// What a scripted URL answers.
    pub(crate) enum Reply {
        Json(serde_json::Value),
        Status(u16),
        /// Never completes; only cancellation ends it.
        Hang,
    }

    /// In-memory fetcher keyed by URL; records every request.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedFetcher {
        replies: Arc<Mutex<HashMap<String, Reply>>>,
        pub(crate) requests: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn reply(self, url: &str, reply: Reply) -> Self {
            self.replies.lock().unwrap().insert(url.to_string(), reply);
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, url: String) -> BoxFuture<'static, Result<serde_json::Value, FetchError>> {
            self.requests.lock().unwrap().push(url.clone());
            let reply = match self.replies.lock().unwrap().get(&url) {
                Some(Reply::Json(value)) => Ok(Some(value.clone())),
                Some(Reply::Status(code)) => Err(*code),
                Some(Reply::Hang) | None => Ok(None),
            };
            Box::pin(async move {
                match reply {
                    Ok(Some(value)) => Ok(value),
                    Err(code) => Err(FetchError::Status(code)),
                    Ok(None) => futures::future::pending().await,
                }
            })
        }
    }
}
