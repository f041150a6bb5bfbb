//! Text-generation backends
//!
//! Every backend receives the same two-turn conversation (system
//! instruction, then the user prompt) and hands back raw reply text.
//! Only the backend knows where that text lives in its response body.

pub mod anthropic;
pub mod groq;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use groq::GroqBackend;
pub use openai::OpenAiBackend;

use async_trait::async_trait;
use log::trace;
use serde::de::DeserializeOwned;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::Provider;

/// One configured generation backend
#[async_trait]
pub trait TextBackend: Send + Sync
{   fn provider(&self) -> Provider;

    /// Raw reply text; `EmptyResponse` when it is blank
    async fn generate_text(
      &self
    , model: &str
    , system_prompt: &str
    , user_prompt: &str
    ) -> Result<String>;
}

/// Build the backend for `provider`.
/// Fails with `Configuration` before any network call when the
/// provider's credential is missing.
pub fn backend_for(
  provider: Provider
, settings: &Settings
) -> Result<Box<dyn TextBackend>>
{   let backend: Box<dyn TextBackend> = match provider
    {   Provider::OpenAI
          => Box::new(OpenAiBackend::from_settings(settings)?)
      , Provider::Anthropic
          => Box::new(AnthropicBackend::from_settings(settings)?)
      , Provider::Groq
          => Box::new(GroqBackend::from_settings(settings)?)
    };
    Ok(backend)
}

/// Environment variable that carries a provider's credential
pub fn api_key_var(provider: Provider) -> &'static str
{   match provider
    {   Provider::OpenAI => "OPENAI_API_KEY"
      , Provider::Anthropic => "ANTHROPIC_API_KEY"
      , Provider::Groq => "GROQ_API_KEY"
    }
}

/// Human-facing provider label used in messages
pub(crate) fn label(provider: Provider) -> &'static str
{   match provider
    {   Provider::OpenAI => "OpenAI"
      , Provider::Anthropic => "Anthropic"
      , Provider::Groq => "Groq"
    }
}

pub(crate) fn require_key(
  settings: &Settings
, provider: Provider
) -> Result<String>
{   settings.api_key_for(provider)
      .map(str::to_string)
      .ok_or_else(|| Error::Configuration(format!(
        "{} is not configured.", api_key_var(provider)
      )))
}

pub(crate) fn http_client(settings: &Settings)
  -> Result<reqwest::Client>
{   reqwest::Client::builder()
      .timeout(settings.request_timeout())
      .build()
      .map_err(|e| Error::HttpError(e.to_string()))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String
{   format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Decode a backend reply, turning non-success statuses into `ApiError`
pub(crate) async fn decode_reply<T: DeserializeOwned>(
  provider: Provider
, response: reqwest::Response
) -> Result<T>
{   let status = response.status();
    trace!("{} response status: {}", label(provider), status);

    if !status.is_success()
    {   let error_text = response.text().await
          .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(Error::ApiError(format!(
          "{} error ({}): {}", label(provider), status, error_text
        )));
    }

    response.json::<T>().await
      .map_err(|e| Error::ParseError(format!(
        "{} response: {}", label(provider), e
      )))
}

/// Trimmed text, or `EmptyResponse` when nothing is left
pub(crate) fn non_empty(provider: Provider, text: &str) -> Result<String>
{   let text = text.trim();
    if text.is_empty()
    {   return Err(Error::EmptyResponse(format!(
          "{} response was empty.", label(provider)
        )));
    }
    Ok(text.to_string())
}
