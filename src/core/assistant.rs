//! The styling assistant context shared by the generation pipelines.
//!
//! Bundles the (optional) language model, the weather provider, the daily limits and
//! the in-memory guest limiter. Without an API key the model is absent and every
//! generation path becomes a no-op rather than an error.

use crate::{
    config::settings::{AssistantConfig, LimitsConfig, Settings, llm_api_key},
    core::quota::GuestQuota,
    errors::Result,
    services::{
        llm::{CompletionRequest, LanguageModel, OpenAiClient},
        weather::{OpenMeteoClient, WeatherProvider},
    },
};
use std::{fmt, sync::Arc};

/// LLM, weather and limits used by the daily batch, instant outfits and chat
pub struct Assistant {
    llm: Option<Arc<dyn LanguageModel>>,
    weather: Arc<dyn WeatherProvider>,
    limits: LimitsConfig,
    config: AssistantConfig,
    guest_chat: GuestQuota,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("llm_configured", &self.llm.is_some())
            .field("limits", &self.limits)
            .field("persona", &self.config.persona_name)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Assembles an assistant from explicit collaborators
    #[must_use]
    pub fn new(
        llm: Option<Arc<dyn LanguageModel>>,
        weather: Arc<dyn WeatherProvider>,
        limits: LimitsConfig,
        config: AssistantConfig,
    ) -> Self {
        Self {
            llm,
            weather,
            guest_chat: GuestQuota::new(limits.guest_chat_messages_per_day),
            limits,
            config,
        }
    }

    /// Builds the production clients. The LLM is only configured when an API key is set.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let llm: Option<Arc<dyn LanguageModel>> = match llm_api_key() {
            Some(key) => {
                let client = OpenAiClient::new(key, &settings.assistant)?;
                Some(Arc::new(client) as Arc<dyn LanguageModel>)
            }
            None => {
                tracing::warn!("No LLM API key set, AI generation is disabled");
                None
            }
        };
        let weather = Arc::new(OpenMeteoClient::new(&settings.weather)?);

        Ok(Self::new(
            llm,
            weather,
            settings.limits,
            settings.assistant.clone(),
        ))
    }

    /// The language model, if configured
    #[must_use]
    pub fn llm(&self) -> Option<&dyn LanguageModel> {
        self.llm.as_deref()
    }

    /// The weather provider
    #[must_use]
    pub fn weather(&self) -> &dyn WeatherProvider {
        self.weather.as_ref()
    }

    /// Daily thresholds
    #[must_use]
    pub const fn limits(&self) -> LimitsConfig {
        self.limits
    }

    /// Guest chat limiter
    #[must_use]
    pub const fn guest_chat(&self) -> &GuestQuota {
        &self.guest_chat
    }

    /// Persona name used in prompts and canned replies
    #[must_use]
    pub fn persona(&self) -> &str {
        &self.config.persona_name
    }

    /// A request using the configured sampling settings
    #[must_use]
    pub fn request(&self, system: impl Into<String>, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(system, prompt)
            .with_sampling(self.config.temperature, self.config.max_tokens)
    }
}
