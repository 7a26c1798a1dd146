use async_trait::async_trait;

use crate::agent::error::AgentError;
use crate::agent::prompts::Prompt;

/// Interface to an external text/vision generation service.
///
/// Implementations make exactly one outbound call per `generate`, never retry,
/// and report every failure as a typed [`AgentError`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send the prompt and return the raw content of the model's answer
    async fn generate(&self, prompt: &Prompt) -> Result<String, AgentError>;
}
