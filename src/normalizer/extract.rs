use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid fence regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Direct,
    Fenced,
    OuterBrackets,
}

type Attempt = fn(&str) -> Option<Value>;

/// Tried in order; the first attempt yielding a JSON object or array wins.
const ATTEMPTS: [(Stage, Attempt); 3] = [
    (Stage::Direct, parse_direct),
    (Stage::Fenced, parse_fenced),
    (Stage::OuterBrackets, parse_outer_brackets),
];

pub fn extract_json(text: &str) -> Option<Value> {
    let (stage, value) = extract_staged(text)?;
    tracing::debug!(target: "normalizer", ?stage, "extracted structured payload");
    Some(value)
}

fn extract_staged(text: &str) -> Option<(Stage, Value)> {
    let text = text.trim();
    ATTEMPTS
        .iter()
        .find_map(|(stage, attempt)| attempt(text).map(|value| (*stage, value)))
}

fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

fn parse_direct(text: &str) -> Option<Value> {
    parse_structured(text)
}

fn parse_fenced(text: &str) -> Option<Value> {
    let inner = FENCED_JSON.captures(text)?.get(1)?;
    parse_structured(inner.as_str())
}

fn parse_outer_brackets(text: &str) -> Option<Value> {
    let start = [text.find('{'), text.find('[')].into_iter().flatten().min()?;
    let end = [text.rfind('}'), text.rfind(']')].into_iter().flatten().max()?;
    if end <= start {
        return None;
    }
    parse_structured(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_parse_takes_precedence() {
        let text = "  {\n  \"is_spam\": true,\n  \"reasons\": [\"promo\"]\n}\n";
        assert!(parse_outer_brackets(text.trim()).is_some());
        let (stage, value) = extract_staged(text).unwrap();
        assert_eq!(stage, Stage::Direct);
        assert_eq!(value, json!({"is_spam": true, "reasons": ["promo"]}));
    }

    #[test]
    fn fence_is_tried_before_bracket_slicing() {
        let text = "```json\n{\"is_phishing\": true}\n```";
        assert!(parse_outer_brackets(text).is_some());
        let (stage, value) = extract_staged(text).unwrap();
        assert_eq!(stage, Stage::Fenced);
        assert_eq!(value, json!({"is_phishing": true}));
    }

    #[test]
    fn fenced_text_without_tag_falls_back_to_brackets() {
        let text = "```\n{\"is_phishing\": true}\n```";
        let (stage, _) = extract_staged(text).unwrap();
        assert_eq!(stage, Stage::OuterBrackets);
    }

    #[test]
    fn fenced_block_is_unwrapped() {
        let text = "Here you go:\n```json\n{\"confidence\": 80}\n```\nThanks!";
        assert_eq!(extract_json(text).unwrap(), json!({"confidence": 80}));
    }

    #[test]
    fn outer_brackets_are_sliced_out() {
        let text = "Sure. Result: {\"is_phishing\": true, \"reasons\": [\"link\"]} hope it helps";
        assert_eq!(
            extract_json(text).unwrap(),
            json!({"is_phishing": true, "reasons": ["link"]})
        );
    }

    #[test]
    fn earliest_opening_bracket_is_used() {
        let text = "list: [{\"a\": 1}] end";
        assert_eq!(extract_json(text).unwrap(), json!([{"a": 1}]));
    }

    #[test]
    fn scalars_do_not_count_as_structured() {
        assert!(extract_json("null").is_none());
        assert!(extract_json("42").is_none());
        assert!(extract_json("\"text\"").is_none());
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(extract_json("I cannot classify this message.").is_none());
        assert!(extract_json("} backwards {").is_none());
        assert!(extract_json("{ not json }").is_none());
        assert!(extract_json("").is_none());
    }
}
