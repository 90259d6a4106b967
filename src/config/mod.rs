pub mod env;
mod loader;

pub use env::{AppConfig, ClassifierKind, HeuristicConfig, LlmConfig, LoggingConfig};
pub use loader::load_config;
