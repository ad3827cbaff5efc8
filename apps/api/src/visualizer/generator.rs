//! Visualizer: orchestrates the concept → artistic description pipeline.
//!
//! Flow: validate concept → credential check → build prompt variants →
//!       invoke model per variant (in order) → classify → extract →
//!       truncation notice → fallback library on exhaustion.
//!
//! `generate` never fails past validation: every provider problem degrades to
//! a fallback outcome.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{GenerationParams, LlmError, ModelClient, ModelResult};
use crate::visualizer::classifier::{classify_and_extract, ResponseClass};
use crate::visualizer::fallback::FallbackLibrary;
use crate::visualizer::prompts::{build_variants, TRUNCATION_NOTICE};

/// Concepts are logged up to this many characters.
const LOG_PREVIEW_CHARS: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisualizeError {
    #[error("Prompt text cannot be empty")]
    EmptyConcept,
}

/// Where the returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Model,
    Fallback,
}

/// Final artifact handed back to the transport. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualOutcome {
    pub text: String,
    pub provenance: Provenance,
    pub truncated: bool,
}

/// Result of trying a single prompt variant.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    StopWith { text: String, truncated: bool },
    Continue,
    StopWithFallback,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct Visualizer {
    client: Arc<dyn ModelClient>,
    params: GenerationParams,
    fallback: FallbackLibrary,
}

impl Visualizer {
    pub fn new(
        client: Arc<dyn ModelClient>,
        params: GenerationParams,
        fallback: FallbackLibrary,
    ) -> Self {
        Self {
            client,
            params,
            fallback,
        }
    }

    /// Turns a concept into a visual description.
    ///
    /// Only a blank concept is an error. Missing credentials, transport
    /// failures, safety blocks and empty answers all end in a fallback outcome.
    pub async fn generate(&self, concept: &str) -> Result<VisualOutcome, VisualizeError> {
        let concept = concept.trim();
        if concept.is_empty() {
            return Err(VisualizeError::EmptyConcept);
        }

        info!(
            "Generating visual description for: {}",
            preview(concept)
        );

        if !self.client.is_configured() {
            warn!("No valid API key, using fallback response");
            return Ok(self.fallback_outcome(concept));
        }

        let variants = build_variants(concept);
        let total = variants.len();

        for (index, prompt) in variants.iter().enumerate() {
            info!("Trying prompt variation {}/{}", index + 1, total);
            match self.try_variant(prompt, index + 1).await {
                Step::StopWith { text, truncated } => {
                    info!("Visual description generated with prompt variation {}", index + 1);
                    return Ok(VisualOutcome {
                        text,
                        provenance: Provenance::Model,
                        truncated,
                    });
                }
                Step::Continue => continue,
                Step::StopWithFallback => break,
            }
        }

        warn!(
            "No usable model output for '{}', using fallback response",
            preview(concept)
        );
        Ok(self.fallback_outcome(concept))
    }

    async fn try_variant(&self, prompt: &str, attempt: usize) -> Step {
        match self.client.invoke(prompt, &self.params).await {
            Ok(result) => step_for(&result, attempt),
            Err(LlmError::ConfigurationMissing) => {
                warn!("Model client lost its credential, stopping retries");
                Step::StopWithFallback
            }
            Err(e) => {
                warn!("Prompt variation {} failed: {}", attempt, e);
                Step::Continue
            }
        }
    }

    fn fallback_outcome(&self, concept: &str) -> VisualOutcome {
        VisualOutcome {
            text: self.fallback.fallback(concept),
            provenance: Provenance::Fallback,
            truncated: false,
        }
    }
}

/// Decides what one classified model result means for the variant loop.
fn step_for(result: &ModelResult, attempt: usize) -> Step {
    let (class, text) = classify_and_extract(result);
    match (class, text) {
        (ResponseClass::Success, Some(text)) => Step::StopWith {
            text,
            truncated: false,
        },
        (ResponseClass::Truncated, Some(text)) => {
            warn!("Response truncated due to length limit, using it anyway");
            Step::StopWith {
                text: append_truncation_notice(text),
                truncated: true,
            }
        }
        (ResponseClass::SafetyBlocked, _) => {
            warn!("Prompt variation {} blocked by safety filter", attempt);
            Step::Continue
        }
        (ResponseClass::Empty, _) => {
            warn!("No candidates in response for prompt variation {}", attempt);
            Step::Continue
        }
        (class, _) => {
            warn!(
                "Unusable response for prompt variation {}: {:?} (finish_reason={:?})",
                attempt, class, result.finish_reason
            );
            Step::Continue
        }
    }
}

/// Ends `text` with exactly one full `TRUNCATION_NOTICE`, dropping any copies
/// (complete or whitespace-trimmed) the text already ends with.
fn append_truncation_notice(text: String) -> String {
    let notice = TRUNCATION_NOTICE.trim_start();
    let mut body = text.trim_end();
    while let Some(rest) = body.strip_suffix(notice) {
        body = rest.trim_end();
    }
    format!("{body}{TRUNCATION_NOTICE}")
}

fn preview(concept: &str) -> String {
    let mut preview: String = concept.chars().take(LOG_PREVIEW_CHARS).collect();
    if concept.chars().count() > LOG_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{Candidate, ContentPart, FinishReason};

    /// Model client that replays canned results and records every prompt.
    pub(crate) struct ScriptedClient {
        configured: bool,
        responses: Mutex<VecDeque<Result<ModelResult, LlmError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub(crate) fn new(responses: Vec<Result<ModelResult, LlmError>>) -> Self {
            Self {
                configured: true,
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::new(vec![])
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn invoke(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<ModelResult, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(empty()))
        }
    }

    pub(crate) fn model_result(finish: FinishReason, text: Option<&str>) -> ModelResult {
        ModelResult {
            text: None,
            finish_reason: finish.clone(),
            candidates: vec![Candidate {
                finish_reason: finish,
                parts: text
                    .map(|t| vec![ContentPart::Text(t.to_string())])
                    .unwrap_or_default(),
            }],
        }
    }

    pub(crate) fn complete(text: &str) -> ModelResult {
        model_result(FinishReason::Complete, Some(text))
    }

    fn blocked() -> ModelResult {
        model_result(FinishReason::SafetyBlocked, None)
    }

    fn empty() -> ModelResult {
        ModelResult {
            text: None,
            finish_reason: FinishReason::Other("NO_CANDIDATES".to_string()),
            candidates: vec![],
        }
    }

    fn visualizer(client: Arc<ScriptedClient>) -> Visualizer {
        Visualizer::new(client, GenerationParams::default(), FallbackLibrary::default())
    }

    #[tokio::test]
    async fn test_blank_concept_is_rejected_without_calls() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(complete("never"))]));
        let v = visualizer(client.clone());

        assert_eq!(v.generate("").await, Err(VisualizeError::EmptyConcept));
        assert_eq!(v.generate("  \n\t ").await, Err(VisualizeError::EmptyConcept));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_configuration_falls_back_without_calls() {
        let client = Arc::new(ScriptedClient::unconfigured());
        let outcome = visualizer(client.clone()).generate("kerinduan").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert!(outcome.text.contains("kerinduan"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_variant_success_is_returned_verbatim() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(complete("## Senja\nLangit jingga"))]));
        let outcome = visualizer(client.clone()).generate("senja").await.unwrap();

        assert_eq!(outcome.text, "## Senja\nLangit jingga");
        assert_eq!(outcome.provenance, Provenance::Model);
        assert!(!outcome.truncated);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_safety_block_moves_to_next_variant() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(blocked()), Ok(complete("X"))]));
        let outcome = visualizer(client.clone()).generate("duka").await.unwrap();

        assert_eq!(outcome.text, "X");
        assert_eq!(outcome.provenance, Provenance::Model);
        assert_eq!(client.calls(), 2);

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(*prompts, build_variants("duka")[..2].to_vec());
    }

    #[tokio::test]
    async fn test_exhausted_variants_fall_back_with_concept_text() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(blocked()),
            Ok(empty()),
            Ok(blocked()),
        ]));
        let outcome = visualizer(client.clone()).generate("kerinduan senja").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert!(outcome.text.contains("kerinduan senja"));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_variants_use_curated_entry_for_known_concept() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(blocked()),
            Ok(blocked()),
            Ok(blocked()),
        ]));
        let outcome = visualizer(client).generate("PEACE").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert!(outcome.text.starts_with("Kedamaian"));
    }

    #[tokio::test]
    async fn test_truncated_output_gets_notice_once() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(model_result(
            FinishReason::LengthLimit,
            Some("Warna ungu yang"),
        ))]));
        let outcome = visualizer(client.clone()).generate("misteri").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Model);
        assert!(outcome.truncated);
        assert!(outcome.text.starts_with("Warna ungu yang"));
        assert!(outcome.text.ends_with(TRUNCATION_NOTICE));
        assert_eq!(outcome.text.matches("dipotong").count(), 1);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_adapter_errors_do_not_abort_the_pipeline() {
        let client = Arc::new(ScriptedClient::new(vec![
            Err(LlmError::Timeout),
            Err(LlmError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
            Ok(complete("Akhirnya")),
        ]));
        let outcome = visualizer(client.clone()).generate("harapan").await.unwrap();

        assert_eq!(outcome.text, "Akhirnya");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_all_adapter_errors_fall_back() {
        let client = Arc::new(ScriptedClient::new(vec![
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
            Err(LlmError::Timeout),
        ]));
        let outcome = visualizer(client).generate("gravitasi").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert!(!outcome.text.is_empty());
    }

    #[tokio::test]
    async fn test_configuration_error_mid_loop_stops_retrying() {
        let client = Arc::new(ScriptedClient::new(vec![Err(LlmError::ConfigurationMissing)]));
        let outcome = visualizer(client.clone()).generate("gravitasi").await.unwrap();

        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_moves_to_next_variant() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(model_result(FinishReason::Complete, None)),
            Ok(model_result(FinishReason::Other("RECITATION".to_string()), Some("x"))),
            Ok(complete("Ketiga")),
        ]));
        let outcome = visualizer(client.clone()).generate("waktu").await.unwrap();

        assert_eq!(outcome.text, "Ketiga");
        assert_eq!(client.calls(), 3);
    }

    #[test]
    fn test_truncation_notice_not_duplicated() {
        let once = append_truncation_notice("abc".to_string());
        assert_eq!(once, format!("abc{TRUNCATION_NOTICE}"));
        assert_eq!(append_truncation_notice(once.clone()), once);
    }

    #[test]
    fn test_trimmed_notice_in_model_text_is_replaced_by_full_notice() {
        let model_text = format!("Warna ungu{}", TRUNCATION_NOTICE.trim_start());
        let text = append_truncation_notice(model_text);

        assert!(text.ends_with(TRUNCATION_NOTICE));
        assert_eq!(text, format!("Warna ungu{TRUNCATION_NOTICE}"));
        assert_eq!(text.matches("dipotong").count(), 1);
    }

    #[test]
    fn test_repeated_notices_collapse_to_one() {
        let model_text = format!("Senja{TRUNCATION_NOTICE}{TRUNCATION_NOTICE}\n");
        let text = append_truncation_notice(model_text);
        assert_eq!(text, format!("Senja{TRUNCATION_NOTICE}"));
    }

    #[test]
    fn test_preview_truncates_long_concepts() {
        let long = "a".repeat(80);
        assert_eq!(preview(&long).chars().count(), LOG_PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }
}
