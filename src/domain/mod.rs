//! Domain layer for sumo-log-shipper.
//!
//! Contains the types shared across all modules:
//! - `LogOptions`: per-call overrides for `log`
//! - `FlushOutcome`: what a flush attempt did
//! - `SessionIdProvider`: injectable session token source
//! - `ShipperError`: Top-level error type

pub mod error;
pub mod options;
pub mod outcome;
pub mod session;

pub use error::ShipperError;
pub use options::LogOptions;
pub use outcome::FlushOutcome;
pub use session::{FixedSessionProvider, SessionIdProvider, UuidSessionProvider};
