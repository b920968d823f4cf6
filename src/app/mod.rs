pub mod config;
pub mod handler;
pub mod logger;
pub mod logging_system;
pub mod timer;

pub use config::{ConfigError, ConfigUpdate, LoggerConfig, OutputFormat};
pub use handler::{CallbackHandler, DeliveryHandler, NoopHandler};
pub use logger::{LoggerBuilder, SumoLogger};
pub use logging_system::{LogLevel, LoggingSystem, setup_logging_safe};
pub use timer::FlushTimer;
