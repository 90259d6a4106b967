use serde::Serialize;
use serde_json::Value;

/// Language codes the detector reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "mr" => Some(Language::Mr),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlAnalysis {
    pub count: u32,
    pub domains: Vec<String>,
    pub suspicious: bool,
    pub reasons: Vec<String>,
}

/// Response body of `/api/detect`. Only the normalizer builds these from
/// upstream data, so every instance satisfies the field invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub is_spam: bool,
    pub is_phishing: bool,
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub language: Language,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<UrlAnalysis>,
}

impl ClassificationResult {
    /// Returned whenever classification could not be completed.
    pub fn fallback() -> Self {
        Self {
            is_spam: false,
            is_phishing: false,
            confidence: 50,
            reasons: vec!["AI analysis unavailable".to_string()],
            language: Language::En,
            suggestions: vec!["Please review manually".to_string()],
            urls: None,
        }
    }
}

/// Untrusted classifier output, consumed once by the normalizer.
#[derive(Debug, Clone)]
pub enum RawPayload {
    Text(String),
    Object(Value),
}
