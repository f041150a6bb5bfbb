use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::debug;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::request::ChatMessage;
use crate::Provider;
use super::TextBackend;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest
{   pub model: String
  , pub input: Vec<ChatMessage>
}

/// Subset of a Responses API body.
/// `output_text` is only present on some deployments; the
/// same text is always reachable through `output`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesReply
{   #[serde(default)]
    pub output_text: Option<String>
  , #[serde(default)]
    pub output: Vec<OutputItem>
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem
{   #[serde(rename = "type", default)]
    pub item_type: String
  , #[serde(default)]
    pub content: Vec<OutputContent>
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputContent
{   #[serde(rename = "type", default)]
    pub content_type: String
  , #[serde(default)]
    pub text: Option<String>
}

impl ResponsesReply
{   /// Aggregated reply text
    pub fn text(&self) -> String
    {   if let Some(text) = self.output_text
          .as_deref()
          .filter(|t| !t.trim().is_empty())
        {   return text.to_string();
        }

        self.output
          .iter()
          .filter(|item| item.item_type == "message")
          .flat_map(|item| item.content.iter())
          .filter(|part| part.content_type == "output_text")
          .filter_map(|part| part.text.as_deref())
          .collect::<Vec<_>>()
          .concat()
    }
}

// ===== Backend =====

pub struct OpenAiBackend
{   api_key: String
  , base_url: String
  , http_client: reqwest::Client
}

impl OpenAiBackend
{   pub fn from_settings(settings: &Settings) -> Result<Self>
    {   debug!("Creating OpenAiBackend");
        Ok(OpenAiBackend
        {   api_key: super::require_key(settings, Provider::OpenAI)?
          , base_url: settings.openai_base_url.clone()
          , http_client: super::http_client(settings)?
        })
    }
}

#[async_trait]
impl TextBackend for OpenAiBackend
{   fn provider(&self) -> Provider
    {   Provider::OpenAI
    }

    async fn generate_text(
      &self
    , model: &str
    , system_prompt: &str
    , user_prompt: &str
    ) -> Result<String>
    {   debug!("OpenAI response request for: {}", model);

        let request = ResponsesRequest
        {   model: model.to_string()
          , input: vec![
              ChatMessage::system(system_prompt)
            , ChatMessage::user(user_prompt)
            ]
        };

        let response = self.http_client
          .post(super::endpoint(&self.base_url, "responses"))
          .header("Authorization", format!("Bearer {}", self.api_key))
          .json(&request)
          .send()
          .await
          .map_err(|e| Error::HttpError(e.to_string()))?;

        let reply: ResponsesReply
          = super::decode_reply(Provider::OpenAI, response).await?;

        super::non_empty(Provider::OpenAI, &reply.text())
    }
}
