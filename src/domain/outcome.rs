use crate::sender::client::TransportResponse;

/// Result of a flush attempt, or of a `log` call that may trigger one.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// Messages were queued but no flush was due.
    Deferred,
    /// Nothing was transmitted: the queue was empty, a send was already in
    /// flight, or the request could not be prepared.
    NotSent,
    /// The batch was accepted by the endpoint and trimmed from the queue.
    Sent {
        count: usize,
        response: TransportResponse,
    },
    /// The batch failed and was kept for the next flush. Only returned when
    /// failures are not propagated to the caller.
    Failed,
}

impl FlushOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, FlushOutcome::Sent { .. })
    }
}
