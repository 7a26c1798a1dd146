use std::sync::Arc;

use crate::agent::agent_factory::{AgentFactory, Agents};
use crate::config::Config;
use crate::notifier::{LogNotifier, Notifier};
use crate::page_fetch::{HttpPageFetcher, PageFetcher};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub agents: Arc<Agents>,
    pub page_fetcher: Arc<dyn PageFetcher>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Build every collaborator from configuration. The credential is read here, once.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let agents = AgentFactory::create_agents(&config.llm_config)?;
        let page_fetcher = HttpPageFetcher::new(&config.fetch_config)?;

        Ok(Self::with_parts(
            config,
            agents,
            Arc::new(page_fetcher),
            Arc::new(LogNotifier),
        ))
    }

    pub fn with_parts(
        config: Config,
        agents: Agents,
        page_fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            agents: Arc::new(agents),
            page_fetcher,
            notifier,
        }
    }
}
