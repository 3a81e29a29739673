use bevy::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint answered HTTP {0}")]
    Status(u16),
    #[error("publisher is not running")]
    Closed,
}

/// One formatted measurement bound for a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub channel: String,
    pub event: String,
    pub payload: String,
}

/// Worker answer for a request, delivered back to the main thread.
#[derive(Debug, Clone)]
pub struct PublishResult {
    pub request: PublishRequest,
    pub outcome: Result<DateTime<Utc>, String>,
}

/// Body POSTed to the pub/sub endpoint. `data` is itself a JSON document.
#[derive(Debug, Serialize)]
pub struct EventBody<'a> {
    pub name: &'a str,
    pub channels: [&'a str; 1],
    pub data: String,
}

impl<'a> EventBody<'a> {
    pub fn from_request(request: &'a PublishRequest) -> Self {
        Self {
            name: &request.event,
            channels: [&request.channel],
            data: serde_json::json!({ "payload": request.payload }).to_string(),
        }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth_token,
        })
    }

    async fn send(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&EventBody::from_request(request));
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Where published measurements go.
pub enum Transport {
    Http(HttpTransport),
    /// No endpoint configured: write the payload to the log only.
    Log,
}

impl Transport {
    async fn send(&self, request: &PublishRequest) -> Result<(), PublishError> {
        match self {
            Transport::Http(http) => http.send(request).await,
            Transport::Log => {
                info!(
                    "[{}] {}: {}",
                    request.channel, request.event, request.payload
                );
                Ok(())
            }
        }
    }
}

/// Handle to the background publisher thread.
///
/// Requests go out over a tokio channel; results come back over a crossbeam
/// channel so Bevy systems can poll them without blocking.
pub struct PublisherHandle {
    requests: Option<mpsc::UnboundedSender<PublishRequest>>,
    results: crossbeam_channel::Receiver<PublishResult>,
    thread: Option<JoinHandle<()>>,
}

impl PublisherHandle {
    /// Start the worker thread with its own tokio runtime.
    pub fn spawn(transport: Transport) -> std::io::Result<Self> {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<PublishRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let thread = std::thread::Builder::new()
            .name("ruler-publisher".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime for publisher: {}", e);
                        return;
                    }
                };

                rt.block_on(async move {
                    while let Some(request) = request_rx.recv().await {
                        let outcome = transport
                            .send(&request)
                            .await
                            .map(|()| Utc::now())
                            .map_err(|e| e.to_string());
                        if result_tx.send(PublishResult { request, outcome }).is_err() {
                            break;
                        }
                    }
                });
                debug!("Publisher thread exiting");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            thread: Some(thread),
        })
    }

    /// Queue a request; returns immediately.
    pub fn publish(&self, request: PublishRequest) -> Result<(), PublishError> {
        let sender = self.requests.as_ref().ok_or(PublishError::Closed)?;
        sender.send(request).map_err(|_| PublishError::Closed)
    }

    /// Results that arrived since the last call.
    pub fn drain_results(&self) -> Vec<PublishResult> {
        self.results.try_iter().collect()
    }

    /// Close the request channel and wait for in-flight sends to finish.
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Publisher thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.requests.is_some()
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Option<PublishResult> {
        self.results.recv_timeout(timeout).ok()
    }
}

impl Drop for PublisherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
