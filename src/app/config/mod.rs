mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("An endpoint value must be provided")]
    MissingEndpoint,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Interval flushing requires a running Tokio runtime")]
    NoRuntime,
}

/// Wire format of the serialized messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON envelope carrying session id and timestamp (default)
    #[default]
    Json,
    /// Messages are sent as given, without an envelope
    Raw,
    /// `<path> <value> <unix-seconds>` metric lines
    Graphite,
    /// `<intrinsic_tags>  <meta_tags> <value> <unix-seconds>` metric lines
    Carbon2,
}

impl OutputFormat {
    /// Resolves the legacy boolean switches. Graphite wins over carbon2,
    /// which wins over raw.
    pub fn from_flags(graphite: bool, carbon2: bool, raw: bool) -> Self {
        if graphite {
            OutputFormat::Graphite
        } else if carbon2 {
            OutputFormat::Carbon2
        } else if raw {
            OutputFormat::Raw
        } else {
            OutputFormat::Json
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Graphite => "application/vnd.sumologic.graphite",
            OutputFormat::Carbon2 => "application/vnd.sumologic.carbon2",
            OutputFormat::Json | OutputFormat::Raw => "application/json",
        }
    }

    pub fn is_metric(self) -> bool {
        matches!(self, OutputFormat::Graphite | OutputFormat::Carbon2)
    }
}

/// Live configuration of a logger instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// HTTP source URL that receives the batches
    pub endpoint: String,

    /// Propagate transport failures to the caller of `log`/`flush_logs`
    pub return_promise: bool,

    /// Default `url` field injected into JSON messages
    pub client_url: String,

    /// Only the recurring timer may trigger a send
    pub use_interval_only: bool,

    /// Recurring flush interval in milliseconds (0 disables the timer)
    pub interval_ms: u64,

    /// Pending message size in characters that triggers a flush (0 disables)
    pub batch_size: usize,

    pub source_name: String,
    pub host_name: String,
    pub source_category: String,

    /// Session token; generated when absent or empty
    pub session_key: Option<String>,

    pub format: OutputFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            return_promise: true,
            client_url: String::new(),
            use_interval_only: false,
            interval_ms: 0,
            batch_size: 0,
            source_name: String::new(),
            host_name: String::new(),
            source_category: String::new(),
            session_key: None,
            format: OutputFormat::Json,
        }
    }
}

impl LoggerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }

    /// Applies every field present in `update`. Returns whether the flush
    /// interval was part of the update.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<bool, ConfigError> {
        if let Some(endpoint) = &update.endpoint {
            validation::validate_endpoint(endpoint)?;
        }

        let ConfigUpdate {
            endpoint,
            return_promise,
            use_interval_only,
            interval_ms,
            batch_size,
            source_category,
            source_name,
            host_name,
            client_url,
        } = update;

        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(return_promise) = return_promise {
            self.return_promise = return_promise;
        }
        if let Some(use_interval_only) = use_interval_only {
            self.use_interval_only = use_interval_only;
        }
        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size;
        }
        if let Some(source_category) = source_category {
            self.source_category = source_category;
        }
        if let Some(source_name) = source_name {
            self.source_name = source_name;
        }
        if let Some(host_name) = host_name {
            self.host_name = host_name;
        }
        if let Some(client_url) = client_url {
            self.client_url = client_url;
        }

        let interval_changed = interval_ms.is_some();
        if let Some(interval_ms) = interval_ms {
            self.interval_ms = interval_ms;
        }

        Ok(interval_changed)
    }
}

/// Partial configuration for `SumoLogger::update_config`. Every `Some` field
/// is applied, including zero and empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub endpoint: Option<String>,
    pub return_promise: Option<bool>,
    pub use_interval_only: Option<bool>,
    pub interval_ms: Option<u64>,
    pub batch_size: Option<usize>,
    pub source_category: Option<String>,
    pub source_name: Option<String>,
    pub host_name: Option<String>,
    pub client_url: Option<String>,
}
