use std::{env, str::FromStr, time::Duration};

use super::env::{
    AppConfig, ClassifierKind, ConfigError, HeuristicConfig, LlmConfig, LoggingConfig,
    ServerConfig,
};

const DEFAULT_SPAM_KEYWORDS: &[&str] = &[
    "free",
    "win",
    "winner",
    "prize",
    "offer",
    "click",
    "buy now",
    "limited time",
    "congratulations",
    "cash",
    "discount",
    "lottery",
    "gift card",
    "subscribe",
    "deal",
];

const DEFAULT_PHISHING_KEYWORDS: &[&str] = &[
    "verify",
    "password",
    "login",
    "bank account",
    "urgent",
    "suspended",
    "locked",
    "confirm your",
    "security alert",
    "otp",
    "credit card",
    "ssn",
    "update your details",
    "immediately",
    "unusual activity",
];

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", 64 * 1024)?,
        };

        let classifier = parse_classifier_kind(env::var("CLASSIFIER").ok().as_deref())?;

        let llm = LlmConfig {
            api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.cerebras.ai/v1/chat/completions".to_string()),
            api_key: env::var("LLM_API_KEY").ok().filter(|v| !v.is_empty()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-oss-120b".to_string()),
            temperature: parse_var("LLM_TEMPERATURE", 0.3)?,
            timeout: Duration::from_millis(parse_var("LLM_TIMEOUT_MS", 30_000)?),
        };

        let heuristic = HeuristicConfig {
            keyword_weight: parse_var("HEURISTIC_KEYWORD_WEIGHT", 10)?,
            url_weight: parse_var("HEURISTIC_URL_WEIGHT", 20)?,
            threshold: parse_var("HEURISTIC_THRESHOLD", 40)?,
            spam_keywords: keyword_list(
                env::var("SPAM_KEYWORDS").ok().as_deref(),
                DEFAULT_SPAM_KEYWORDS,
            ),
            phishing_keywords: keyword_list(
                env::var("PHISHING_KEYWORDS").ok().as_deref(),
                DEFAULT_PHISHING_KEYWORDS,
            ),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            logs_dir: match env::var("LOGS_DIR") {
                Ok(dir) if dir.trim().is_empty() => None,
                Ok(dir) => Some(dir),
                Err(_) => Some("logs".to_string()),
            },
        };

        Ok(Self {
            server,
            classifier,
            llm,
            heuristic,
            logging,
        })
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            keyword_weight: 10,
            url_weight: 20,
            threshold: 40,
            spam_keywords: keyword_list(None, DEFAULT_SPAM_KEYWORDS),
            phishing_keywords: keyword_list(None, DEFAULT_PHISHING_KEYWORDS),
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    parse_value(key, env::var(key).ok().as_deref(), default)
}

fn parse_value<T: FromStr>(
    key: &'static str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_classifier_kind(raw: Option<&str>) -> Result<ClassifierKind, ConfigError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("llm") => Ok(ClassifierKind::Llm),
        Some("heuristic") => Ok(ClassifierKind::Heuristic),
        Some(other) => Err(ConfigError::Invalid {
            key: "CLASSIFIER",
            value: other.to_string(),
        }),
    }
}

fn keyword_list(raw: Option<&str>, defaults: &[&str]) -> Vec<String> {
    let custom = raw
        .map(|value| {
            value
                .split(',')
                .map(|part| part.trim().to_lowercase())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if custom.is_empty() {
        defaults.iter().map(|k| k.to_string()).collect()
    } else {
        custom
    }
}
