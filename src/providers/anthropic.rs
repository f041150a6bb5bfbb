use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::debug;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::request::ChatMessage;
use crate::Provider;
use super::TextBackend;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_MAX_TOKENS: u32 = 2000;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest
{   pub model: String
  , pub max_tokens: u32
  , pub system: String
  , pub messages: Vec<ChatMessage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesReply
{   #[serde(default)]
    pub content: Vec<ContentBlock>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock
{   #[serde(rename = "type")]
    pub block_type: String
  , #[serde(default)]
    pub text: Option<String>
}

impl MessagesReply
{   /// Text blocks joined by newlines; other block types are skipped
    pub fn text(&self) -> String
    {   self.content
          .iter()
          .filter(|b| b.block_type == "text")
          .filter_map(|b| b.text.as_deref())
          .collect::<Vec<_>>()
          .join("\n")
    }
}

// ===== Backend =====

pub struct AnthropicBackend
{   api_key: String
  , base_url: String
  , http_client: reqwest::Client
}

impl AnthropicBackend
{   pub fn from_settings(settings: &Settings) -> Result<Self>
    {   debug!("Creating AnthropicBackend");
        Ok(AnthropicBackend
        {   api_key: super::require_key(settings, Provider::Anthropic)?
          , base_url: settings.anthropic_base_url.clone()
          , http_client: super::http_client(settings)?
        })
    }
}

#[async_trait]
impl TextBackend for AnthropicBackend
{   fn provider(&self) -> Provider
    {   Provider::Anthropic
    }

    async fn generate_text(
      &self
    , model: &str
    , system_prompt: &str
    , user_prompt: &str
    ) -> Result<String>
    {   debug!("Anthropic message request for: {}", model);

        // System turn travels as a top-level field here
        let request = MessagesRequest
        {   model: model.to_string()
          , max_tokens: ANTHROPIC_MAX_TOKENS
          , system: system_prompt.to_string()
          , messages: vec![ChatMessage::user(user_prompt)]
        };

        let response = self.http_client
          .post(super::endpoint(&self.base_url, "v1/messages"))
          .header("x-api-key", self.api_key.as_str())
          .header("anthropic-version", ANTHROPIC_VERSION)
          .json(&request)
          .send()
          .await
          .map_err(|e| Error::HttpError(e.to_string()))?;

        let reply: MessagesReply
          = super::decode_reply(Provider::Anthropic, response).await?;

        super::non_empty(Provider::Anthropic, &reply.text())
    }
}
