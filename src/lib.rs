#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond counters fit in u64
    clippy::missing_errors_doc,       // Error enums are self-describing
    clippy::module_name_repetitions,  // e.g. TransportError in sender::client
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

//! Buffered batch log shipping to Sumo Logic HTTP sources.
//!
//! ```no_run
//! use sumo_log_shipper::{LogOptions, LoggerConfig, SumoLogger};
//!
//! # async fn run() -> Result<(), sumo_log_shipper::ShipperError> {
//! let logger = SumoLogger::new(LoggerConfig {
//!     interval_ms: 5_000,
//!     ..LoggerConfig::new("https://endpoint1.collection.sumologic.com/receiver/v1/http/XXX")
//! })?;
//! logger.log("user signed in", LogOptions::new()).await?;
//! logger.flush_logs().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod buffer;
pub mod domain;
pub mod sender;

// Re-export main types for easy access
pub use app::{
    CallbackHandler, ConfigUpdate, DeliveryHandler, LoggerBuilder, LoggerConfig, OutputFormat,
    SumoLogger,
};
pub use domain::{FlushOutcome, LogOptions, SessionIdProvider, ShipperError};
pub use sender::{ReqwestTransport, Transport, TransportConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
