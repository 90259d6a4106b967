pub const MAX_MESSAGE_CHARS: usize = 2000;

/// User text made safe for embedding inside an instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedMessage(String);

impl SanitizedMessage {
    /// Returns `None` when nothing but whitespace was submitted.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let truncated: String = trimmed.chars().take(MAX_MESSAGE_CHARS).collect();
        let cleaned = truncated
            .replace('"', "'")
            .replace("\r\n", " ")
            .replace(['\r', '\n'], " ");
        Some(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
