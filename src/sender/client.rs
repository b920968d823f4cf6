use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),
    #[error("HTTP error: {status} - {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A POST ready to go out: target URL, headers and newline-joined body.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

/// Normalized response of a successful POST.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: String,
}

/// HTTP POST capability used by the logger.
///
/// Implementations decide what counts as a failure; the bundled
/// [`ReqwestTransport`] treats every non-2xx status as one.
pub trait Transport: Send + Sync + 'static {
    fn post(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn post(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        (**self).post(request)
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    pub enable_compression: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("sumo-log-shipper/{}", crate::VERSION),
            enable_compression: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ConnectionStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

/// Default transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
    stats: Arc<ClientStats>,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut client_builder = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent);

        if config.enable_compression {
            client_builder = client_builder.gzip(true);
        }

        let client = client_builder.build().map_err(|e| {
            TransportError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(ClientStats::new()),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.stats.snapshot()
    }
}

impl Transport for ReqwestTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let start = Instant::now();

        let sent = timeout(
            self.config.timeout,
            self.client
                .post(request.url)
                .headers(request.headers)
                .body(request.body)
                .send(),
        )
        .await;

        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                self.stats.record_request(false, start.elapsed());
                return Err(TransportError::Request(err));
            }
            Err(_) => {
                self.stats.record_request(false, start.elapsed());
                return Err(TransportError::Timeout(self.config.timeout));
            }
        };

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Failed to read response body (HTTP {}): {}", status.as_u16(), err);
                String::new()
            }
        };

        let success = status.is_success();
        self.stats.record_request(success, start.elapsed());

        if success {
            Ok(TransportResponse {
                status: status.as_u16(),
                status_text,
                headers,
                body,
            })
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                status_text,
                body,
            })
        }
    }
}
