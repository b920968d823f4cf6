use super::error::ValidationError;
use crate::app::config::{LoggerConfig, OutputFormat};
use crate::domain::LogOptions;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

const GRAPHITE_FIELDS: &[&str] = &["path", "value"];
const CARBON2_FIELDS: &[&str] = &["intrinsic_tags", "meta_tags", "value"];

/// Canonical timestamp used in JSON envelopes, e.g. `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Seconds since the epoch, rounded to the nearest second.
pub fn unix_seconds(timestamp: DateTime<Utc>) -> i64 {
    (timestamp.timestamp_millis() + 500).div_euclid(1000)
}

/// Turns caller messages into the strings that are queued and sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Checks the whole message before anything is formatted. An array is a
    /// sequence of messages and every element must pass.
    pub fn validate(&self, format: OutputFormat, message: &Value) -> Result<(), ValidationError> {
        match message {
            Value::Array(items) if items.is_empty() => Err(ValidationError::EmptyMessage),
            Value::Array(items) => items
                .iter()
                .try_for_each(|item| validate_item(format, item)),
            item => validate_item(format, item),
        }
    }

    /// Validates and serializes `message` for the active output format.
    pub fn format(
        &self,
        config: &LoggerConfig,
        message: Value,
        options: &LogOptions,
        session: &str,
    ) -> Result<Vec<String>, ValidationError> {
        self.validate(config.format, &message)?;

        let timestamp = options.timestamp.unwrap_or_else(Utc::now);
        let envelope = Envelope {
            session_id: non_empty(options.session_key.as_deref()).unwrap_or(session),
            timestamp,
            url: non_empty(options.url.as_deref()).or_else(|| non_empty(Some(config.client_url.as_str()))),
        };

        let items = match message {
            Value::Array(items) => items,
            item => vec![item],
        };

        Ok(items
            .into_iter()
            .map(|item| envelope.render(config.format, item))
            .collect())
    }
}

struct Envelope<'a> {
    session_id: &'a str,
    timestamp: DateTime<Utc>,
    url: Option<&'a str>,
}

impl Envelope<'_> {
    fn render(&self, format: OutputFormat, item: Value) -> String {
        match format {
            OutputFormat::Graphite => format!(
                "{} {} {}",
                field(&item, "path"),
                field(&item, "value"),
                unix_seconds(self.timestamp)
            ),
            // Two spaces between the tag groups are part of the carbon2 wire format
            OutputFormat::Carbon2 => format!(
                "{}  {} {} {}",
                field(&item, "intrinsic_tags"),
                field(&item, "meta_tags"),
                field(&item, "value"),
                unix_seconds(self.timestamp)
            ),
            OutputFormat::Raw => match item {
                Value::String(text) => text,
                other => other.to_string(),
            },
            OutputFormat::Json => {
                let mut object = match item {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("msg".to_string(), other);
                        map
                    }
                };
                object.insert(
                    "sessionId".to_string(),
                    Value::String(self.session_id.to_string()),
                );
                object.insert(
                    "timestamp".to_string(),
                    Value::String(format_timestamp(self.timestamp)),
                );
                if let Some(url) = self.url {
                    object.insert("url".to_string(), Value::String(url.to_string()));
                }
                Value::Object(object).to_string()
            }
        }
    }
}

fn validate_item(format: OutputFormat, item: &Value) -> Result<(), ValidationError> {
    match item {
        Value::Null => return Err(ValidationError::MissingValue),
        Value::Object(map) if map.is_empty() => return Err(ValidationError::EmptyMessage),
        Value::Array(items) if items.is_empty() => return Err(ValidationError::EmptyMessage),
        _ => {}
    }

    if !format.is_metric() {
        return Ok(());
    }

    let (fields, missing) = if format == OutputFormat::Graphite {
        (GRAPHITE_FIELDS, ValidationError::MissingGraphiteFields)
    } else {
        (CARBON2_FIELDS, ValidationError::MissingCarbon2Fields)
    };
    if has_fields(item, fields) {
        Ok(())
    } else {
        Err(missing)
    }
}

fn has_fields(item: &Value, fields: &[&str]) -> bool {
    item.as_object()
        .is_some_and(|map| fields.iter().all(|name| map.contains_key(*name)))
}

fn field(item: &Value, name: &str) -> String {
    match item.get(name) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
