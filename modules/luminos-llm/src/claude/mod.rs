mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};

use crate::schema::StructuredOutput;
use client::ClaudeClient;
use types::*;

const TOOL_NAME: &str = "structured_response";

// =============================================================================
// Claude Agent
// =============================================================================

#[derive(Clone)]
pub struct Claude {
    api_key: String,
    model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key, self.http.clone());
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Ask for a `T` by forcing a single tool call whose input schema is `T`.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        self.extract_message(system_prompt.into(), WireMessage::user(user_prompt))
            .await
    }

    /// Like [`Claude::extract`], with an image block ahead of the prompt.
    pub async fn extract_with_image<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        bytes: &[u8],
        mime_type: &str,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        use base64::Engine;

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let message =
            WireMessage::user_with_image(ImageSource::base64(mime_type, encoded), user_prompt);
        self.extract_message(system_prompt.into(), message).await
    }

    async fn extract_message<T: StructuredOutput>(
        &self,
        system_prompt: String,
        message: WireMessage,
    ) -> Result<T> {
        let request = ChatRequest::new(&self.model)
            .system(system_prompt)
            .message(message)
            .temperature(0.0)
            .forced_tool(ToolDefinitionWire {
                name: TOOL_NAME.to_string(),
                description: format!("Return the {} for the input.", T::type_name()),
                input_schema: T::tool_schema(),
            });

        let response = self.client().chat(&request).await?;

        let input = response.tool_input(TOOL_NAME).ok_or_else(|| {
            anyhow!(
                "No structured output in Claude response: {}",
                response.text().unwrap_or("<no text>")
            )
        })?;

        serde_json::from_value(input.clone())
            .map_err(|e| anyhow!("Failed to deserialize {}: {}", T::type_name(), e))
    }
}

impl std::fmt::Debug for Claude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claude")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
