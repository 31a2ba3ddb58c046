//! Application runtime glue: layered configuration and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, AppConfigProvider, CliArgs, LoggingConfig, Section};
pub use logging::init_logging_from_config;
