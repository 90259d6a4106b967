use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub classifier: ClassifierKind,
    pub llm: LlmConfig,
    pub heuristic: HeuristicConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Llm,
    Heuristic,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Scoring knobs for the keyword engine. The defaults are untuned.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    pub keyword_weight: u32,
    pub url_weight: u32,
    pub threshold: u32,
    pub spam_keywords: Vec<String>,
    pub phishing_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub logs_dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for environment variable {key}")]
    Invalid { key: &'static str, value: String },
}
