use super::{ConfigError, LoggerConfig};
use url::Url;

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Client URL is copied into messages verbatim and is not checked
        validate_endpoint(&self.endpoint)
    }
}

pub(super) fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.trim().is_empty() {
        return Err(ConfigError::MissingEndpoint);
    }

    Url::parse(endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {}", endpoint, e))
    })?;

    Ok(())
}
