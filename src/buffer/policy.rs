use super::queue::PendingQueue;
use crate::app::config::LoggerConfig;
use serde_json::Value;

/// Decision of the flush policy for the current queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    /// Neither batching nor an interval is configured: send on every submission.
    Immediate,
    /// Pending messages reached the configured batch size. Size-based
    /// flushing takes over from the recurring timer.
    SizeThresholdReached { pending_chars: usize },
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        !matches!(self, Readiness::NotReady)
    }

    pub fn supersedes_timer(self) -> bool {
        matches!(self, Readiness::SizeThresholdReached { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlushPolicy;

impl FlushPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, config: &LoggerConfig, queue: &PendingQueue) -> Readiness {
        if config.batch_size == 0 {
            return if config.interval_ms == 0 {
                Readiness::Immediate
            } else {
                Readiness::NotReady
            };
        }

        let pending_chars = pending_batch_size(queue.iter());
        if pending_chars >= config.batch_size {
            Readiness::SizeThresholdReached { pending_chars }
        } else {
            Readiness::NotReady
        }
    }
}

/// Length in characters of the pending messages' text joined with newlines,
/// one trailing newline per entry.
///
/// JSON envelopes count their `msg` field only. Anything that is not a JSON
/// object (raw text, metric lines) counts in full.
pub fn pending_batch_size<'a, I>(entries: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    entries
        .into_iter()
        .map(|entry| message_chars(entry) + 1)
        .sum()
}

fn message_chars(entry: &str) -> usize {
    match serde_json::from_str::<Value>(entry) {
        Ok(Value::Object(map)) => match map.get("msg") {
            Some(Value::String(text)) => text.chars().count(),
            Some(other) => other.to_string().chars().count(),
            None => 0,
        },
        _ => entry.chars().count(),
    }
}
