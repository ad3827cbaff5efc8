// Visualize pipeline: concept → prompt variants → model → classification → text,
// with a curated fallback library when the model cannot deliver.
// All model calls go through llm_client, never directly to Gemini.

pub mod classifier;
pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
