use super::client::{OutboundRequest, Transport, TransportError, TransportResponse};
use crate::app::config::LoggerConfig;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Client identifier sent with every batch.
pub const SUMO_CLIENT: &str = "sumo-rust-sdk";

const X_SUMO_CLIENT: HeaderName = HeaderName::from_static("x-sumo-client");
const X_SUMO_NAME: HeaderName = HeaderName::from_static("x-sumo-name");
const X_SUMO_CATEGORY: HeaderName = HeaderName::from_static("x-sumo-category");
const X_SUMO_HOST: HeaderName = HeaderName::from_static("x-sumo-host");

#[derive(Error, Debug)]
pub enum TransmissionError {
    #[error("Invalid header value for {header}: {details}")]
    InvalidHeaderValue { header: &'static str, details: String },
}

/// Stateless bridge between the queue and the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transmitter;

impl Transmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn build_headers(&self, config: &LoggerConfig) -> Result<HeaderMap, TransmissionError> {
        let mut headers = HeaderMap::new();

        headers.insert(X_SUMO_CLIENT, HeaderValue::from_static(SUMO_CLIENT));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(config.format.content_type()),
        );

        // Source metadata, only when configured
        for (name, label, value) in [
            (X_SUMO_NAME, "X-Sumo-Name", &config.source_name),
            (X_SUMO_CATEGORY, "X-Sumo-Category", &config.source_category),
            (X_SUMO_HOST, "X-Sumo-Host", &config.host_name),
        ] {
            if value.is_empty() {
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransmissionError::InvalidHeaderValue {
                    header: label,
                    details: e.to_string(),
                }
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Builds the POST for `batch` against the configured endpoint.
    pub fn prepare(
        &self,
        config: &LoggerConfig,
        batch: &[String],
    ) -> Result<OutboundRequest, TransmissionError> {
        Ok(OutboundRequest {
            url: config.endpoint.clone(),
            headers: self.build_headers(config)?,
            body: batch.join("\n"),
        })
    }

    pub async fn transmit<T: Transport>(
        &self,
        transport: &T,
        request: OutboundRequest,
        batch_len: usize,
    ) -> Result<TransportResponse, TransportError> {
        let start = Instant::now();
        let bytes = request.body.len();

        debug!("Sending {} messages ({} bytes)", batch_len, bytes);

        match transport.post(request).await {
            Ok(response) => {
                info!(
                    "Sent {} messages ({} bytes) in {:?}: HTTP {}",
                    batch_len,
                    bytes,
                    start.elapsed(),
                    response.status
                );
                Ok(response)
            }
            Err(err) => {
                warn!("Failed to send {} messages: {}", batch_len, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::OutputFormat;

    #[test]
    fn test_default_headers() {
        let headers = Transmitter::new()
            .build_headers(&LoggerConfig::new("https://x"))
            .unwrap();

        assert_eq!(headers.get("x-sumo-client").unwrap(), SUMO_CLIENT);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get("x-sumo-name").is_none());
        assert!(headers.get("x-sumo-category").is_none());
        assert!(headers.get("x-sumo-host").is_none());
    }

    #[test]
    fn test_metric_content_types() {
        let transmitter = Transmitter::new();
        let graphite = LoggerConfig {
            format: OutputFormat::Graphite,
            ..LoggerConfig::new("https://x")
        };
        let carbon2 = LoggerConfig {
            format: OutputFormat::Carbon2,
            ..LoggerConfig::new("https://x")
        };

        assert_eq!(
            transmitter.build_headers(&graphite).unwrap()[CONTENT_TYPE],
            "application/vnd.sumologic.graphite"
        );
        assert_eq!(
            transmitter.build_headers(&carbon2).unwrap()[CONTENT_TYPE],
            "application/vnd.sumologic.carbon2"
        );
    }

    #[test]
    fn test_source_headers() {
        let config = LoggerConfig {
            source_name: "web".to_string(),
            source_category: "prod/web".to_string(),
            host_name: "web-01".to_string(),
            ..LoggerConfig::new("https://x")
        };

        let headers = Transmitter::new().build_headers(&config).unwrap();
        assert_eq!(headers["x-sumo-name"], "web");
        assert_eq!(headers["x-sumo-category"], "prod/web");
        assert_eq!(headers["x-sumo-host"], "web-01");
    }

    #[test]
    fn test_invalid_header_value() {
        let config = LoggerConfig {
            host_name: "bad\nhost".to_string(),
            ..LoggerConfig::new("https://x")
        };

        let result = Transmitter::new().build_headers(&config);
        assert!(matches!(
            result,
            Err(TransmissionError::InvalidHeaderValue {
                header: "X-Sumo-Host",
                ..
            })
        ));
    }

    #[test]
    fn test_prepare_joins_with_newlines() {
        let request = Transmitter::new()
            .prepare(
                &LoggerConfig::new("https://x/receiver"),
                &["a".to_string(), "b".to_string()],
            )
            .unwrap();

        assert_eq!(request.url, "https://x/receiver");
        assert_eq!(request.body, "a\nb");
    }
}
