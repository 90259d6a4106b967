pub mod message;
pub mod types;

pub use message::SanitizedMessage;
pub use types::{ClassificationResult, Language, RawPayload, UrlAnalysis};
