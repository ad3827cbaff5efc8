//! Response classification and text extraction.
//!
//! Decision order (first match wins):
//! 1. no candidates → `Empty`
//! 2. first candidate blocked by safety → `SafetyBlocked`
//! 3. first candidate hit the length limit → `Truncated` (usable, flagged)
//! 4. first candidate complete with non-empty text → `Success`
//! 5. anything else → `Malformed`
//!
//! Only `Success` and `Truncated` stop the variant loop.

use crate::llm_client::{ContentPart, FinishReason, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Truncated,
    SafetyBlocked,
    Empty,
    Malformed,
}

impl ResponseClass {
    pub fn is_usable(self) -> bool {
        matches!(self, ResponseClass::Success | ResponseClass::Truncated)
    }
}

pub fn classify(result: &ModelResult) -> ResponseClass {
    let Some(first) = result.candidates.first() else {
        return ResponseClass::Empty;
    };

    match first.finish_reason {
        FinishReason::SafetyBlocked => ResponseClass::SafetyBlocked,
        FinishReason::LengthLimit => ResponseClass::Truncated,
        FinishReason::Complete if extract_text(result).is_some() => ResponseClass::Success,
        FinishReason::Complete | FinishReason::Other(_) => ResponseClass::Malformed,
    }
}

/// Pulls the answer text out of a result.
///
/// Prefers the consolidated `text` field; otherwise joins every text part of the
/// first candidate with no separator. Returns `None` when both come up blank.
pub fn extract_text(result: &ModelResult) -> Option<String> {
    if let Some(text) = result.text.as_deref().map(str::trim) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let joined: String = result
        .candidates
        .first()?
        .parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            ContentPart::Other => None,
        })
        .collect();

    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

/// Classifies and extracts in one step. A usable class with no extractable text
/// is downgraded to `Malformed`.
pub fn classify_and_extract(result: &ModelResult) -> (ResponseClass, Option<String>) {
    let class = classify(result);
    if !class.is_usable() {
        return (class, None);
    }
    match extract_text(result) {
        Some(text) => (class, Some(text)),
        None => (ResponseClass::Malformed, None),
    }
}
