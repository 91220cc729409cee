//! External collaborators - the LLM provider and the weather provider.
//!
//! Both sit behind `async-trait` traits so the generation pipelines in `core` can be
//! exercised with in-process fakes.

/// OpenAI-compatible chat-completions client
pub mod llm;
/// Open-Meteo geocoding + forecast client
pub mod weather;
