//! Remote fetch with a bounded, immediate retry loop.

use crate::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// One GET against a remote resource, returning the raw body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Production transport over a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::debug!("HTTP request to {} failed: {}", url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown status"),
            ));
        }

        response.text().await.map_err(FetchError::from)
    }
}

/// Fetches and decodes JSON resources, retrying transient failures.
#[derive(Clone)]
pub struct RemoteFetcher {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
}

impl RemoteFetcher {
    /// Default attempt budget: one request plus three retries.
    pub const DEFAULT_ATTEMPTS: u32 = 4;

    pub fn new(transport: Arc<dyn Transport>, max_attempts: u32) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_with_retry(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse JSON response from {}: {}", url, e);
            FetchError::Client(format!("invalid response body from {url}: {e}"))
        })
    }

    // No backoff between attempts.
    async fn get_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            tracing::debug!("Fetching {} (attempt {}/{})", url, attempt, self.max_attempts);
            match self.transport.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Transient failure fetching {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Giving up on {} after {} attempt(s): {}", url, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted transport: each URL answers from its queue, the last answer repeats.
    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<HashMap<String, VecDeque<Result<String, FetchError>>>>,
        delays: Mutex<HashMap<String, Duration>>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl ScriptedTransport {
        pub fn respond(&self, url: &str, answer: Result<String, FetchError>) -> &Self {
            self.routes
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back(answer);
            self
        }

        pub fn delay(&self, url: &str, delay: Duration) -> &Self {
            self.delays.lock().unwrap().insert(url.to_string(), delay);
            self
        }

        pub fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

            let delay = self.delays.lock().unwrap().get(url).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => Err(FetchError::NotFound),
            }
        }
    }
}
