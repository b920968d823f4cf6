use crate::domain::ShipperError;
use crate::sender::TransportResponse;

#[cfg(test)]
use mockall::automock;

/// Receives delivery notifications from the logger.
///
/// Called after the logger's internal state has been released, so handlers
/// may call back into the logger.
#[cfg_attr(test, automock)]
pub trait DeliveryHandler: Send + Sync {
    fn on_success(&self, _response: &TransportResponse) {}

    fn on_error(&self, _error: &ShipperError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl DeliveryHandler for NoopHandler {}

type SuccessFn = Box<dyn Fn(&TransportResponse) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&ShipperError) + Send + Sync>;

/// Closure-based handler.
#[derive(Default)]
pub struct CallbackHandler {
    on_success: Option<SuccessFn>,
    on_error: Option<ErrorFn>,
}

impl CallbackHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TransportResponse) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ShipperError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl DeliveryHandler for CallbackHandler {
    fn on_success(&self, response: &TransportResponse) {
        if let Some(callback) = &self.on_success {
            callback(response);
        }
    }

    fn on_error(&self, error: &ShipperError) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }
}

impl std::fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
