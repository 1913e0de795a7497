//! ExplainPassageHandler - Turn a scripture passage into a three-block narrative

use std::sync::Arc;

use crate::domain::narrative::{format_instructions, NarrativeFormatter, SegmentSource};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Persona sent as the system prompt, ahead of the marker instructions.
const MENTOR_PERSONA: &str =
    "You are a reality-focused mentor. Advise firmly and clearly, without preaching.";

/// Command to explain a passage
#[derive(Debug, Clone)]
pub struct ExplainPassageCommand {
    /// Per-request model override
    pub model: Option<String>,
    /// Citation, e.g. "Romans 8:28"
    pub reference: String,
    /// Passage text
    pub passage: String,
}

/// Result of explaining a passage
#[derive(Debug, Clone)]
pub struct ExplainPassageResult {
    /// Display-ready narrative
    pub explanation: String,
    /// Which extraction path shaped the reply
    pub source: SegmentSource,
    /// Model that produced the reply
    pub model: String,
}

/// Sampling settings applied to every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 600,
        }
    }
}

/// Error type for explaining passages
#[derive(Debug)]
pub enum ExplainPassageError {
    /// A required field is missing or blank
    InvalidInput(String),
    /// The model call failed
    AIProvider(AIError),
}

impl std::fmt::Display for ExplainPassageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExplainPassageError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ExplainPassageError::AIProvider(err) => write!(f, "AI provider error: {}", err),
        }
    }
}

impl std::error::Error for ExplainPassageError {}

impl From<AIError> for ExplainPassageError {
    fn from(err: AIError) -> Self {
        ExplainPassageError::AIProvider(err)
    }
}

/// Handler for explaining passages
pub struct ExplainPassageHandler {
    provider: Arc<dyn AIProvider>,
    formatter: Arc<NarrativeFormatter>,
    settings: GenerationSettings,
}

impl ExplainPassageHandler {
    pub fn new(provider: Arc<dyn AIProvider>, formatter: Arc<NarrativeFormatter>) -> Self {
        Self {
            provider,
            formatter,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn handle(
        &self,
        cmd: ExplainPassageCommand,
    ) -> Result<ExplainPassageResult, ExplainPassageError> {
        // 1. Validate input
        let reference = cmd.reference.trim();
        let passage = cmd.passage.trim();
        if reference.is_empty() || passage.is_empty() {
            return Err(ExplainPassageError::InvalidInput(
                "reference and verse are required".to_string(),
            ));
        }

        // 2. Ask the model for a tagged reply
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut request = CompletionRequest::new(RequestMetadata::new(&trace_id))
            .with_system_prompt(system_prompt())
            .with_message(MessageRole::User, user_prompt(reference, passage))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        if let Some(model) = cmd.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            request = request.with_model(model);
        }

        tracing::info!(%trace_id, reference, "Explaining passage");
        let completion = self.provider.complete(request).await?;

        // 3. Reshape into the three display blocks
        let shaped = self
            .formatter
            .shape(&completion.content, self.formatter.length_limit(), &mut rand::thread_rng());

        Ok(ExplainPassageResult {
            explanation: shaped.text,
            source: shaped.source,
            model: completion.model,
        })
    }
}

fn system_prompt() -> String {
    format!("{}\n\n{}", MENTOR_PERSONA, format_instructions())
}

fn user_prompt(reference: &str, passage: &str) -> String {
    format!(
        "{}\n{}\n\nDrawing on the passage above, give concise and confident advice \
         about the present situation and the next step to take.",
        reference, passage
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::narrative::BLOCK_SEPARATOR;

    fn command(reference: &str, passage: &str) -> ExplainPassageCommand {
        ExplainPassageCommand {
            model: None,
            reference: reference.to_string(),
            passage: passage.to_string(),
        }
    }

    fn handler(provider: &MockAIProvider) -> ExplainPassageHandler {
        ExplainPassageHandler::new(
            Arc::new(provider.clone()),
            Arc::new(NarrativeFormatter::new()),
        )
    }

    #[tokio::test]
    async fn test_explain_formats_tagged_reply() {
        let provider = MockAIProvider::new().with_response(
            "::P1::Paul writes from prison. He still rejoices.::/P1::\
             ::P2::You feel boxed in.::BR2::Joy will surprise you.::/P2::\
             ::P3::Write down one good thing tonight.::/P3::",
        );

        let result = handler(&provider)
            .handle(command("Philippians 4:4", "Rejoice in the Lord always."))
            .await
            .unwrap();

        assert_eq!(result.source, SegmentSource::Markers);
        assert_eq!(result.model, "mock-model-1");
        let blocks: Vec<&str> = result.explanation.split(BLOCK_SEPARATOR).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "Paul writes from prison.\nHe still rejoices.");
        assert_eq!(blocks[1].lines().count(), 2);
        assert_eq!(blocks[2], "Write down one good thing tonight.");
    }

    #[tokio::test]
    async fn test_explain_falls_back_to_heuristic() {
        let provider =
            MockAIProvider::new().with_response("Context here.\n\nYou are tired.\n\nRest.");

        let result = handler(&provider)
            .handle(command("Matthew 11:28", "Come to me, all who are weary."))
            .await
            .unwrap();

        assert_eq!(result.source, SegmentSource::Heuristic);
        assert!(result.explanation.starts_with("Context here.\n\n"));
        assert!(result.explanation.ends_with("\n\nRest."));
    }

    #[tokio::test]
    async fn test_explain_builds_request() {
        let provider = MockAIProvider::new();
        let handler = handler(&provider).with_settings(GenerationSettings {
            temperature: 0.3,
            max_tokens: 200,
        });

        let mut cmd = command(" John 3:16 ", "For God so loved the world");
        cmd.model = Some("gpt-4o-mini".to_string());
        let result = handler.handle(cmd).await.unwrap();

        assert_eq!(result.model, "gpt-4o-mini");
        let request = provider.last_call().unwrap();
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(200));
        assert!(request.system_prompt.unwrap().contains("::BR2::"));
        assert!(request.messages[0]
            .content
            .starts_with("John 3:16\nFor God so loved the world\n\n"));
        assert!(!request.metadata.trace_id.is_empty());
    }

    #[tokio::test]
    async fn test_blank_model_uses_provider_default() {
        let provider = MockAIProvider::new();
        let mut cmd = command("Psalm 46:10", "Be still, and know");
        cmd.model = Some("  ".to_string());

        handler(&provider).handle(cmd).await.unwrap();
        assert!(provider.last_call().unwrap().model.is_none());
    }

    #[tokio::test]
    async fn test_explain_rejects_blank_fields() {
        let provider = MockAIProvider::new();
        let handler = handler(&provider);

        for cmd in [command("", "text"), command("Ref", "   ")] {
            let result = handler.handle(cmd).await;
            assert!(matches!(result, Err(ExplainPassageError::InvalidInput(_))));
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_explain_propagates_provider_error() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);

        let result = handler(&provider)
            .handle(command("Romans 8:28", "All things work together"))
            .await;

        assert!(matches!(
            result,
            Err(ExplainPassageError::AIProvider(AIError::AuthenticationFailed))
        ));
    }

    #[tokio::test]
    async fn test_explain_respects_length_limit() {
        let provider = MockAIProvider::new().with_response(format!(
            "::P1::{}::/P1::",
            "Grace meets you here. ".repeat(20)
        ));
        let handler = ExplainPassageHandler::new(
            Arc::new(provider),
            Arc::new(NarrativeFormatter::new().with_length_limit(50)),
        );

        let result = handler
            .handle(command("2 Corinthians 12:9", "My grace is sufficient"))
            .await
            .unwrap();
        assert!(result.explanation.chars().count() <= 50);
    }
}
