use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::agent::stateless_llm::openai_compatible_llm::OpenAICompatibleLLM;
use crate::agent::stateless_llm::GenerationClient;
use crate::config::LlmConfig;

/// Factory for creating generation clients
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Endpoint used when the configuration does not name one
    pub fn default_base_url(llm_provider: &str) -> Option<&'static str> {
        match llm_provider {
            "openai_llm" | "openai_compatible_llm" => Some("https://api.openai.com/v1"),
            "deepseek_llm" => Some("https://api.deepseek.com/v1"),
            "groq_llm" => Some("https://api.groq.com/openai/v1"),
            "mistral_llm" => Some("https://api.mistral.ai/v1"),
            "gemini_llm" => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
            "ollama_llm" => Some("http://localhost:11434/v1"),
            _ => None,
        }
    }

    /// Create a client for the configured provider.
    ///
    /// # Arguments
    /// * `config` - LLM configuration
    /// * `api_key` - The credential; callers only build live clients when one exists
    pub fn create_client(config: &LlmConfig, api_key: String) -> Result<Arc<dyn GenerationClient>> {
        info!("Initializing LLM: {}", config.provider);

        let default_url = Self::default_base_url(&config.provider)
            .ok_or_else(|| anyhow::anyhow!("Unsupported LLM provider: {}", config.provider))?;
        let base_url = config
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_url.to_string());

        let llm = OpenAICompatibleLLM::new(
            config.model.clone(),
            base_url,
            api_key,
            config.organization_id.clone(),
            config.project_id.clone(),
            config.temperature,
            config.max_tokens,
            config.request_timeout(),
        )?;
        Ok(Arc::new(llm))
    }
}
