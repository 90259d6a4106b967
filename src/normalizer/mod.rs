//! Turns untrusted classifier output into a [`ClassificationResult`].
//!
//! Text from the LLM goes through [`extract::extract_json`] first; objects
//! from the heuristic engine go straight to field coercion.

mod coerce;
mod extract;

use thiserror::Error;

use crate::domain::{ClassificationResult, RawPayload};

pub use coerce::coerce;
pub use extract::extract_json;

#[derive(Debug, Error)]
#[error("upstream classifier response contained no parseable JSON")]
pub struct UnparsableResponse;

pub fn normalize(raw: RawPayload) -> Result<ClassificationResult, UnparsableResponse> {
    let value = match raw {
        RawPayload::Text(text) => extract_json(&text).ok_or(UnparsableResponse)?,
        RawPayload::Object(value) => value,
    };
    Ok(coerce(&value))
}
