use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::agent::input_types::{AgentRequest, TaskKind};
use crate::agent::mock::{MockContext, MockProvider};
use crate::agent::normalizer::ResponseNormalizer;
use crate::agent::output_types::{AgentResult, Payload, Schema};
use crate::agent::prompts::{PromptBuilder, ResponseFormat};
use crate::agent::stateless_llm::GenerationClient;

/// Operating mode, fixed when the agent is built
#[derive(Clone)]
pub enum AgentMode {
    Live(Arc<dyn GenerationClient>),
    Mocked,
}

/// One task-specific pipeline: prompt, generate, normalize, fall back.
///
/// Holds no per-call state, so a single instance can serve concurrent requests.
#[derive(Clone)]
pub struct Agent {
    kind: TaskKind,
    schema: Schema,
    mode: AgentMode,
}

impl Agent {
    pub fn live(kind: TaskKind, client: Arc<dyn GenerationClient>) -> Self {
        Self {
            kind,
            schema: Schema::for_task(kind),
            mode: AgentMode::Live(client),
        }
    }

    pub fn mocked(kind: TaskKind) -> Self {
        warn!("{} agent initialized without API key. Using mock mode.", kind);
        Self {
            kind,
            schema: Schema::for_task(kind),
            mode: AgentMode::Mocked,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, AgentMode::Live(_))
    }

    /// Run the request. Never fails: any error on the live path yields mock content.
    pub async fn invoke(&self, request: &AgentRequest) -> Payload {
        let span = info_span!(
            "agent_invoke",
            task = %self.kind,
            language = request.language().tag(),
            invocation_id = %Uuid::new_v4()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &AgentRequest) -> Payload {
        if request.kind() != self.kind {
            error!(
                "{} agent received a {} request, answering with mock content",
                self.kind,
                request.kind()
            );
            return MockProvider::mock(self.kind, request.language(), &MockContext::default());
        }

        let client = match &self.mode {
            AgentMode::Mocked => {
                debug!("Serving mock response");
                return MockProvider::for_request(request);
            }
            AgentMode::Live(client) => client,
        };

        match self.generate(client.as_ref(), request).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    error_kind = err.kind(),
                    "Live generation failed, falling back to mock response: {}", err
                );
                MockProvider::for_request(request)
            }
        }
    }

    async fn generate(&self, client: &dyn GenerationClient, request: &AgentRequest) -> AgentResult {
        let prompt = PromptBuilder::build(request);
        let raw = client.generate(&prompt).await?;

        match prompt.format {
            ResponseFormat::Json => ResponseNormalizer::normalize(&raw, &self.schema),
            ResponseFormat::Text => ResponseNormalizer::normalize_text(&raw, &self.schema),
        }
    }
}
