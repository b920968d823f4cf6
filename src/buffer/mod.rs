pub mod error;
pub mod format;
pub mod policy;
pub mod queue;

pub use error::ValidationError;
pub use format::{MessageFormatter, format_timestamp, unix_seconds};
pub use policy::{FlushPolicy, Readiness, pending_batch_size};
pub use queue::PendingQueue;
