use chrono::{DateTime, Utc};

/// Per-call overrides accepted by `SumoLogger::log`.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Replaces the logger's session token for this call only.
    pub session_key: Option<String>,
    /// Point in time stamped on the messages; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
    /// Takes precedence over the configured client URL.
    pub url: Option<String>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
