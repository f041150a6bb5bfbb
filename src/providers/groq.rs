use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::request::ChatMessage;
use crate::Provider;
use super::TextBackend;

/// Sampling temperature, low for repeatable scripts
pub const GROQ_TEMPERATURE: f32 = 0.2;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GroqChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ReplyMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Backend =====

/// OpenAI-compatible chat completions, hosted at a configurable base URL
pub struct GroqBackend
{   api_key: String
  , base_url: String
  , http_client: reqwest::Client
}

impl GroqBackend
{   pub fn from_settings(settings: &Settings) -> Result<Self>
    {   debug!("Creating GroqBackend");
        Ok(GroqBackend
        {   api_key: super::require_key(settings, Provider::Groq)?
          , base_url: settings.groq_base_url.clone()
          , http_client: super::http_client(settings)?
        })
    }
}

#[async_trait]
impl TextBackend for GroqBackend
{   fn provider(&self) -> Provider
    {   Provider::Groq
    }

    async fn generate_text(
      &self
    , model: &str
    , system_prompt: &str
    , user_prompt: &str
    ) -> Result<String>
    {   debug!("Groq chat completion for: {}", model);

        let request = GroqChatRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage::system(system_prompt)
            , ChatMessage::user(user_prompt)
            ]
          , temperature: GROQ_TEMPERATURE
        };

        trace!("Groq request model={} messages={}"
          , request.model, request.messages.len());

        let response = self.http_client
          .post(super::endpoint(&self.base_url, "chat/completions"))
          .header("Authorization", format!("Bearer {}", self.api_key))
          .json(&request)
          .send()
          .await
          .map_err(|e| Error::HttpError(e.to_string()))?;

        let chat_response: GroqChatResponse
          = super::decode_reply(Provider::Groq, response).await?;

        let text = chat_response.choices
          .into_iter()
          .next()
          .and_then(|c| c.message.content)
          .unwrap_or_default();

        super::non_empty(Provider::Groq, &text)
    }
}
