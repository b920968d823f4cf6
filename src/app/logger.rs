use super::config::{ConfigUpdate, LoggerConfig};
use super::handler::{DeliveryHandler, NoopHandler};
use super::timer::FlushTimer;
use crate::buffer::{FlushPolicy, MessageFormatter, PendingQueue, Readiness};
use crate::domain::{
    FlushOutcome, LogOptions, SessionIdProvider, ShipperError, UuidSessionProvider,
};
use crate::sender::{ReqwestTransport, Transmitter, Transport, TransportConfig};
use parking_lot::Mutex;
use serde_json::Value;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Buffers log messages and ships them in batches to a Sumo Logic HTTP source.
///
/// Messages are formatted on submission and kept in a FIFO queue. A flush is
/// triggered by submission (when the flush policy says so), by the recurring
/// timer, or explicitly through [`SumoLogger::flush_logs`]. At most one batch
/// is in flight at any time, and messages leave the queue only once the
/// endpoint has accepted them.
pub struct SumoLogger<T: Transport = ReqwestTransport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for SumoLogger<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    state: Mutex<EngineState>,
    transport: T,
    handler: Arc<dyn DeliveryHandler>,
    formatter: MessageFormatter,
    policy: FlushPolicy,
    transmitter: Transmitter,
}

struct EngineState {
    config: LoggerConfig,
    session: String,
    queue: PendingQueue,
    sending: bool,
    timer: FlushTimer,
}

pub struct LoggerBuilder<T> {
    config: LoggerConfig,
    transport: T,
    handler: Arc<dyn DeliveryHandler>,
    session_provider: Arc<dyn SessionIdProvider>,
}

impl<T: Transport> LoggerBuilder<T> {
    pub fn new(config: LoggerConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            handler: Arc::new(NoopHandler),
            session_provider: Arc::new(UuidSessionProvider),
        }
    }

    pub fn handler(mut self, handler: impl DeliveryHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    pub fn shared_handler(mut self, handler: Arc<dyn DeliveryHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn session_provider(mut self, provider: impl SessionIdProvider + 'static) -> Self {
        self.session_provider = Arc::new(provider);
        self
    }

    /// Validates the configuration and starts the flush timer when an
    /// interval is configured.
    pub fn build(self) -> Result<SumoLogger<T>, ShipperError> {
        if let Err(err) = self.config.validate() {
            error!("Cannot create logger: {}", err);
            return Err(err.into());
        }

        let session = match self.config.session_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => self.session_provider.session_id(),
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState {
                config: self.config,
                session,
                queue: PendingQueue::new(),
                sending: false,
                timer: FlushTimer::new(),
            }),
            transport: self.transport,
            handler: self.handler,
            formatter: MessageFormatter::new(),
            policy: FlushPolicy::new(),
            transmitter: Transmitter::new(),
        });

        {
            let mut state = shared.state.lock();
            shared.arm_timer(&mut state)?;
        }

        Ok(SumoLogger { shared })
    }
}

impl SumoLogger<ReqwestTransport> {
    /// Logger with the default `reqwest` transport.
    pub fn new(config: LoggerConfig) -> Result<Self, ShipperError> {
        let transport = ReqwestTransport::new(TransportConfig::default())?;
        LoggerBuilder::new(config, transport).build()
    }
}

impl<T: Transport> SumoLogger<T> {
    pub fn builder(config: LoggerConfig, transport: T) -> LoggerBuilder<T> {
        LoggerBuilder::new(config, transport)
    }

    /// Formats and queues `message`, then flushes if the policy says a flush
    /// is due. A JSON array is treated as a sequence of messages.
    ///
    /// Invalid messages are reported to the error handler and returned as
    /// `Err` without touching the queue.
    pub async fn log(
        &self,
        message: impl Into<Value>,
        options: LogOptions,
    ) -> Result<FlushOutcome, ShipperError> {
        let readiness = {
            let mut state = self.shared.state.lock();
            let formatted = self.shared.formatter.format(
                &state.config,
                message.into(),
                &options,
                &state.session,
            );

            let lines = match formatted {
                Ok(lines) => lines,
                Err(err) => {
                    drop(state);
                    warn!("Rejected log message: {}", err);
                    let err = ShipperError::from(err);
                    self.shared.handler.on_error(&err);
                    return Err(err);
                }
            };

            debug!("Queued {} messages", lines.len());
            state.queue.extend(lines);

            if state.config.use_interval_only {
                return Ok(FlushOutcome::Deferred);
            }
            self.shared.evaluate(&mut state)
        };

        if readiness.is_ready() {
            self.shared.flush().await
        } else {
            Ok(FlushOutcome::Deferred)
        }
    }

    /// Sends everything queued right now.
    pub async fn flush_logs(&self) -> Result<FlushOutcome, ShipperError> {
        self.shared.flush().await
    }

    /// Whether the queued messages are due for a flush. Reaching the batch
    /// size stops the recurring timer.
    pub fn is_ready_to_flush(&self) -> bool {
        let mut state = self.shared.state.lock();
        self.shared.evaluate(&mut state).is_ready()
    }

    pub fn empty_log_queue(&self) {
        self.shared.state.lock().queue.clear();
    }

    /// Applies the supplied fields. Changing the interval restarts the
    /// timer; an interval of zero stops it.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<(), ShipperError> {
        let mut state = self.shared.state.lock();
        let interval_changed = state.config.apply(update)?;

        if interval_changed {
            if state.config.interval_ms > 0 {
                self.shared.arm_timer(&mut state)?;
            } else {
                state.timer.disarm();
            }
        }
        Ok(())
    }

    pub fn start_log_sending(&self) -> Result<(), ShipperError> {
        let mut state = self.shared.state.lock();
        self.shared.arm_timer(&mut state)?;
        Ok(())
    }

    pub fn stop_log_sending(&self) {
        self.shared.state.lock().timer.disarm();
    }

    pub fn timer_armed(&self) -> bool {
        self.shared.state.lock().timer.is_armed()
    }

    pub fn is_sending(&self) -> bool {
        self.shared.state.lock().sending
    }

    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn pending_logs(&self) -> Vec<String> {
        self.shared.state.lock().queue.snapshot()
    }

    pub fn config(&self) -> LoggerConfig {
        self.shared.state.lock().config.clone()
    }

    pub fn session_id(&self) -> String {
        self.shared.state.lock().session.clone()
    }

    pub fn transport(&self) -> &T {
        &self.shared.transport
    }
}

impl<T: Transport> Shared<T> {
    fn evaluate(&self, state: &mut EngineState) -> Readiness {
        let readiness = self.policy.evaluate(&state.config, &state.queue);
        if readiness.supersedes_timer() && state.timer.is_armed() {
            debug!("Batch size reached, size-based flushing replaces the timer");
            state.timer.disarm();
        }
        readiness
    }

    fn arm_timer(self: &Arc<Self>, state: &mut EngineState) -> Result<(), ShipperError> {
        if state.config.interval_ms == 0 {
            return Ok(());
        }

        let shared = Arc::downgrade(self);
        state.timer.arm(state.config.interval(), move || {
            let Some(shared) = shared.upgrade() else {
                return ControlFlow::Break(());
            };
            tokio::spawn(async move {
                // Failures already went to the handler
                let _ = shared.flush().await;
            });
            ControlFlow::Continue(())
        })?;
        Ok(())
    }

    async fn flush(self: &Arc<Self>) -> Result<FlushOutcome, ShipperError> {
        let (request, batch_len, return_promise, in_flight) = {
            let mut state = self.state.lock();
            if state.sending {
                debug!("Flush skipped: a send is already in flight");
                return Ok(FlushOutcome::NotSent);
            }
            if state.queue.is_empty() {
                return Ok(FlushOutcome::NotSent);
            }

            let snapshot = state.queue.snapshot();
            match self.transmitter.prepare(&state.config, &snapshot) {
                Ok(request) => {
                    state.sending = true;
                    (
                        request,
                        snapshot.len(),
                        state.config.return_promise,
                        InFlight { state: &self.state },
                    )
                }
                Err(err) => {
                    drop(state);
                    warn!("Could not prepare batch: {}", err);
                    self.handler.on_error(&ShipperError::from(err));
                    return Ok(FlushOutcome::NotSent);
                }
            }
        };

        let result = self
            .transmitter
            .transmit(&self.transport, request, batch_len)
            .await;

        match result {
            Ok(response) => {
                let rearmed = {
                    let mut state = self.state.lock();
                    state.queue.trim_front(batch_len);
                    in_flight.finish(&mut state);
                    self.arm_timer(&mut state)
                };
                if let Err(err) = rearmed {
                    warn!("Could not restart flush timer: {}", err);
                }

                self.handler.on_success(&response);
                Ok(FlushOutcome::Sent {
                    count: batch_len,
                    response,
                })
            }
            Err(err) => {
                drop(in_flight);
                let err = ShipperError::from(err);
                self.handler.on_error(&err);

                if return_promise {
                    Err(err)
                } else {
                    Ok(FlushOutcome::Failed)
                }
            }
        }
    }
}

/// Clears the in-flight flag when the send fails or its future is dropped.
/// A successful send releases the flag through [`InFlight::finish`] under the
/// same lock that trims the queue, so the flag is cleared exactly once.
struct InFlight<'a> {
    state: &'a Mutex<EngineState>,
}

impl InFlight<'_> {
    fn finish(self, state: &mut EngineState) {
        state.sending = false;
        std::mem::forget(self);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().sending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::handler::MockDeliveryHandler;
    use crate::buffer::ValidationError;
    use crate::domain::FixedSessionProvider;
    use crate::sender::{OutboundRequest, TransportError, TransportResponse};
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct StubTransport {
        requests: Mutex<Vec<OutboundRequest>>,
        fail: AtomicBool,
    }

    impl Transport for StubTransport {
        async fn post(
            &self,
            request: OutboundRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().push(request);
            if self.fail.load(Ordering::SeqCst) {
                return Err(TransportError::Other("connection refused".to_string()));
            }
            Ok(TransportResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: HeaderMap::new(),
                body: String::new(),
            })
        }
    }

    fn logger_with(
        config: LoggerConfig,
        handler: MockDeliveryHandler,
    ) -> SumoLogger<Arc<StubTransport>> {
        SumoLogger::builder(config, Arc::new(StubTransport::default()))
            .handler(handler)
            .session_provider(FixedSessionProvider("session-1".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_endpoint_fails_construction() {
        let result = SumoLogger::builder(LoggerConfig::default(), StubTransport::default()).build();
        assert!(matches!(
            result,
            Err(ShipperError::Config(crate::app::config::ConfigError::MissingEndpoint))
        ));
    }

    #[test]
    fn test_session_key_takes_precedence_over_provider() {
        let config = LoggerConfig {
            session_key: Some("configured".to_string()),
            ..LoggerConfig::new("https://x")
        };
        let logger = SumoLogger::builder(config, StubTransport::default())
            .session_provider(FixedSessionProvider("generated".to_string()))
            .build()
            .unwrap();

        assert_eq!(logger.session_id(), "configured");
    }

    #[tokio::test]
    async fn test_rejected_message_reaches_error_handler() {
        let mut handler = MockDeliveryHandler::new();
        handler
            .expect_on_error()
            .withf(|err| {
                matches!(
                    err,
                    ShipperError::Validation(ValidationError::EmptyMessage)
                )
            })
            .times(1)
            .return_const(());
        handler.expect_on_success().never();

        let logger = logger_with(LoggerConfig::new("https://x"), handler);
        let result = logger.log(json!({}), LogOptions::new()).await;

        assert!(result.is_err());
        assert_eq!(logger.pending_count(), 0);
        assert!(logger.transport().requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_success_handler_called_once_per_batch() {
        let mut handler = MockDeliveryHandler::new();
        handler.expect_on_success().times(1).return_const(());
        handler.expect_on_error().never();

        let logger = logger_with(LoggerConfig::new("https://x"), handler);
        let outcome = logger.log("hi", LogOptions::new()).await.unwrap();

        assert!(outcome.is_sent());
        assert_eq!(logger.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_without_promise_is_reported_not_returned() {
        let mut handler = MockDeliveryHandler::new();
        handler
            .expect_on_error()
            .withf(ShipperError::is_transport)
            .times(1)
            .return_const(());

        let config = LoggerConfig {
            return_promise: false,
            ..LoggerConfig::new("https://x")
        };
        let logger = logger_with(config, handler);
        logger.transport().fail.store(true, Ordering::SeqCst);

        let outcome = logger.log("hi", LogOptions::new()).await.unwrap();

        assert_eq!(outcome, FlushOutcome::Failed);
        assert_eq!(logger.pending_count(), 1);
        assert!(!logger.is_sending());
    }

    #[tokio::test]
    async fn test_prepare_error_is_not_sent_and_releases_flag() {
        let mut handler = MockDeliveryHandler::new();
        handler
            .expect_on_error()
            .withf(|err| matches!(err, ShipperError::Preparation(_)))
            .times(1)
            .return_const(());

        let config = LoggerConfig {
            source_name: "bad\nname".to_string(),
            ..LoggerConfig::new("https://x")
        };
        let logger = logger_with(config, handler);

        let outcome = logger.log("hi", LogOptions::new()).await.unwrap();

        assert_eq!(outcome, FlushOutcome::NotSent);
        assert_eq!(logger.pending_count(), 1);
        assert!(!logger.is_sending());
        assert!(logger.transport().requests.lock().is_empty());
    }
}
