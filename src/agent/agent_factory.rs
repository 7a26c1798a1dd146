use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::agent::agents::Agent;
use crate::agent::input_types::TaskKind;
use crate::agent::stateless_llm::GenerationClient;
use crate::agent::stateless_llm_factory::StatelessLLMFactory;
use crate::config::LlmConfig;

/// The four agents served by the HTTP layer
#[derive(Clone)]
pub struct Agents {
    pub site_audit: Agent,
    pub image_analysis: Agent,
    pub copywriter: Agent,
    pub architect: Agent,
}

impl Agents {
    /// All agents sharing one live generation client
    pub fn live(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            site_audit: Agent::live(TaskKind::SiteAudit, client.clone()),
            image_analysis: Agent::live(TaskKind::ImageAnalysis, client.clone()),
            copywriter: Agent::live(TaskKind::CopyGeneration, client.clone()),
            architect: Agent::live(TaskKind::UiGeneration, client),
        }
    }

    /// All agents in offline demo mode
    pub fn mocked() -> Self {
        Self {
            site_audit: Agent::mocked(TaskKind::SiteAudit),
            image_analysis: Agent::mocked(TaskKind::ImageAnalysis),
            copywriter: Agent::mocked(TaskKind::CopyGeneration),
            architect: Agent::mocked(TaskKind::UiGeneration),
        }
    }

    pub fn get(&self, kind: TaskKind) -> &Agent {
        match kind {
            TaskKind::SiteAudit => &self.site_audit,
            TaskKind::ImageAnalysis => &self.image_analysis,
            TaskKind::CopyGeneration => &self.copywriter,
            TaskKind::UiGeneration => &self.architect,
        }
    }

    pub fn is_live(&self) -> bool {
        TaskKind::ALL.iter().all(|kind| self.get(*kind).is_live())
    }
}

/// Factory for creating agent instances
pub struct AgentFactory;

impl AgentFactory {
    /// Create the agents once at startup.
    ///
    /// The credential is read here and never again: with a key every agent is
    /// live, without one every agent serves mock content.
    pub fn create_agents(config: &LlmConfig) -> Result<Agents> {
        match config.credential() {
            Some(api_key) => {
                let client = StatelessLLMFactory::create_client(config, api_key)?;
                info!("Agents running in live mode with model {}", config.model);
                Ok(Agents::live(client))
            }
            None => Ok(Agents::mocked()),
        }
    }
}
