//! OpenAI chat-completions implementation of the text transform.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, CreateChatCompletionResponse},
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::base::{config::Config, error::TransformError, prompts};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let mut cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        if let Some(base) = &config.openai_api_base {
            cfg = cfg.with_api_base(base.clone());
        }

        Self {
            client: Client::with_config(cfg),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::transform", skip_all, fields(model = %self.model))]
    async fn transform(&self, instruction: &str, body: &str) -> Result<String, TransformError> {
        let prompt = prompts::build_prompt(instruction, body);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| TransformError::Upstream(format!("Failed to build message: {e}")))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| TransformError::Upstream(format!("Failed to build request: {e}")))?;

        debug!("Sending correction request ({} chars) ...", body.len());

        let response = self.client.chat().create(request).await.map_err(|e| TransformError::Upstream(e.to_string()))?;

        let text = parse_completion_text(&response)?;

        info!("Received correction ({} chars).", text.len());

        Ok(text)
    }
}

/// Pull the first choice's text out of a completion response.
pub fn parse_completion_text(response: &CreateChatCompletionResponse) -> Result<String, TransformError> {
    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or_else(|| TransformError::Upstream("Response contained no completion text.".to_string()))?;

    let content = content.trim();

    if content.is_empty() {
        return Err(TransformError::Upstream("Response contained empty completion text.".to_string()));
    }

    Ok(content.to_string())
}

// Tests.
