//! Wire types for the Gemini `generateContent` endpoint and the provider-agnostic
//! `ModelResult` the rest of the service works with.
//!
//! All payload-shape handling stays in this file. The classifier and the
//! generator only ever see `ModelResult`.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::MINDCANVAS_PERSONA;

// ────────────────────────────────────────────────────────────────────────────
// Generation parameters
// ────────────────────────────────────────────────────────────────────────────

/// Fixed sampling configuration sent with every call. Built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub system_instruction: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 800,
            system_instruction: Some(MINDCANVAS_PERSONA.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider-agnostic result
// ────────────────────────────────────────────────────────────────────────────

/// Why the provider stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    LengthLimit,
    SafetyBlocked,
    Other(String),
}

impl FinishReason {
    /// Maps a Gemini `finishReason` string.
    pub fn from_gemini(raw: Option<&str>) -> Self {
        match raw {
            Some("STOP") => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::LengthLimit,
            Some("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII") => {
                FinishReason::SafetyBlocked
            }
            Some(other) => FinishReason::Other(other.to_string()),
            None => FinishReason::Other("UNSPECIFIED".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Inline data, function calls, anything without a text field.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub finish_reason: FinishReason,
    pub parts: Vec<ContentPart>,
}

/// Uniform result of one model invocation.
///
/// `text` is the consolidated answer for providers that expose one; the Gemini
/// REST API does not, so it is left `None` there and text lives in `candidates`.
/// An empty `candidates` list is a valid, empty response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResult {
    pub text: Option<String>,
    /// Informational only (logging). Classification always reads the first
    /// candidate's `finish_reason`, never this field.
    pub finish_reason: FinishReason,
    pub candidates: Vec<Candidate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Request payload
// ────────────────────────────────────────────────────────────────────────────

const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_ONLY_HIGH";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl<'a> GenerateContentRequest<'a> {
    pub(crate) fn new(prompt: &'a str, params: &'a GenerationParams) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            system_instruction: params.system_instruction.as_deref().map(|text| {
                SystemInstruction {
                    parts: vec![TextPart { text }],
                }
            }),
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response payload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    prompt_feedback: Option<PromptFeedback>,
    pub(crate) usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<RawContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
struct RawPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub(crate) prompt_token_count: u32,
    #[serde(default)]
    pub(crate) candidates_token_count: u32,
}

impl GenerateContentResponse {
    pub(crate) fn into_model_result(self) -> ModelResult {
        let candidates: Vec<Candidate> = self
            .candidates
            .into_iter()
            .map(|raw| Candidate {
                finish_reason: FinishReason::from_gemini(raw.finish_reason.as_deref()),
                parts: raw
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .map(|part| match part.text {
                                Some(text) => ContentPart::Text(text),
                                None => ContentPart::Other,
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        // A prompt rejected outright comes back with no candidates and a block reason.
        let prompt_blocked = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .is_some();

        let finish_reason = match candidates.first() {
            Some(first) => first.finish_reason.clone(),
            None if prompt_blocked => FinishReason::SafetyBlocked,
            None => FinishReason::Other("NO_CANDIDATES".to_string()),
        };

        ModelResult {
            text: None,
            finish_reason,
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ModelResult {
        serde_json::from_str::<GenerateContentResponse>(json)
            .unwrap()
            .into_model_result()
    }

    #[test]
    fn test_request_uses_gemini_field_names() {
        let params = GenerationParams::default();
        let value = serde_json::to_value(GenerateContentRequest::new("Describe peace", &params))
            .unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Describe peace");
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 800);
        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("MindCanvas"));
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
    }

    #[test]
    fn test_request_omits_system_instruction_when_unset() {
        let params = GenerationParams {
            system_instruction: None,
            ..GenerationParams::default()
        };
        let value = serde_json::to_value(GenerateContentRequest::new("x", &params)).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_complete_response_keeps_parts_in_order() {
        let result = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Langit "}, {"text": "biru"}]},
                    "finishReason": "STOP",
                    "index": 0
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 40}
            }"#,
        );

        assert_eq!(result.finish_reason, FinishReason::Complete);
        assert_eq!(result.text, None);
        assert_eq!(
            result.candidates[0].parts,
            vec![
                ContentPart::Text("Langit ".to_string()),
                ContentPart::Text("biru".to_string())
            ]
        );
    }

    #[test]
    fn test_safety_blocked_candidate_without_content() {
        let result = parse(r#"{"candidates": [{"finishReason": "SAFETY", "index": 0}]}"#);
        assert_eq!(result.finish_reason, FinishReason::SafetyBlocked);
        assert!(result.candidates[0].parts.is_empty());
    }

    #[test]
    fn test_blocked_prompt_has_no_candidates() {
        let result = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(result.candidates.is_empty());
        assert_eq!(result.finish_reason, FinishReason::SafetyBlocked);
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_gemini(Some("MAX_TOKENS")), FinishReason::LengthLimit);
        assert_eq!(
            FinishReason::from_gemini(Some("PROHIBITED_CONTENT")),
            FinishReason::SafetyBlocked
        );
        assert_eq!(
            FinishReason::from_gemini(Some("RECITATION")),
            FinishReason::Other("RECITATION".to_string())
        );
        assert!(matches!(FinishReason::from_gemini(None), FinishReason::Other(_)));
    }

    #[test]
    fn test_non_text_parts_are_kept_as_other() {
        let result = parse(
            r#"{"candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AA=="}}, {"text": "ok"}]},
                "finishReason": "STOP"
            }]}"#,
        );
        assert_eq!(
            result.candidates[0].parts,
            vec![ContentPart::Other, ContentPart::Text("ok".to_string())]
        );
    }
}
