//! Configuration for providers and the remote transport

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use log::debug;
use crate::Provider;

pub const DEFAULT_REMOTE_HOST: &str = "127.0.0.1";
pub const DEFAULT_REMOTE_PORT: u16 = 9876;

/// Connection parameters for the remote application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig
{   /// Host used when the caller does not name one
    pub host: String
  , /// Port used when the caller does not name one
    pub port: u16
  , /// Deadline for establishing the TCP connection
    pub connect_timeout: Duration
  , /// Deadline for each individual read
    pub read_timeout: Duration
  , /// Deadline for writing the request
    pub write_timeout: Duration
}

impl Default for TransportConfig
{   fn default() -> Self
    {   TransportConfig
        {   host: DEFAULT_REMOTE_HOST.to_string()
          , port: DEFAULT_REMOTE_PORT
          , connect_timeout: Duration::from_secs(5)
          , read_timeout: Duration::from_secs(45)
          , write_timeout: Duration::from_secs(10)
        }
    }
}

/// Immutable settings snapshot, read once at startup and
/// passed by reference into the transport and the dispatcher
#[derive(Clone)]
pub struct Settings
{   pub openai_api_key: Option<String>
  , pub anthropic_api_key: Option<String>
  , pub groq_api_key: Option<String>
  , pub openai_base_url: String
  , pub anthropic_base_url: String
  , pub groq_base_url: String
  , /// Used when a selector is blank or cannot be classified
    pub default_provider: Provider
  , pub default_openai_model: String
  , pub default_anthropic_model: String
  , pub default_groq_model: String
  , /// Per-request timeout for backend HTTP calls
    pub request_timeout_secs: u64
  , /// Optional text appended to the system instruction
    pub strategy_file: Option<PathBuf>
  , pub remote: TransportConfig
}

impl Default for Settings
{   fn default() -> Self
    {   Settings
        {   openai_api_key: None
          , anthropic_api_key: None
          , groq_api_key: None
          , openai_base_url: "https://api.openai.com/v1".to_string()
          , anthropic_base_url: "https://api.anthropic.com".to_string()
          , groq_base_url: "https://api.groq.com/openai/v1".to_string()
          , default_provider: Provider::OpenAI
          , default_openai_model: "gpt-4o-mini".to_string()
          , default_anthropic_model
              : "claude-3-5-sonnet-latest".to_string()
          , default_groq_model
              : "llama-3.3-70b-versatile".to_string()
          , request_timeout_secs: 120
          , strategy_file: None
          , remote: TransportConfig::default()
        }
    }
}

impl Settings
{   /// Load from the process environment, after merging an
    /// optional `.env` file that never overrides set variables
    pub fn from_env() -> Self
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded env file: {}", path.display())
          , Err(_) => debug!("No .env file loaded")
        }
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    /// Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };
        let defaults = Settings::default();
        let remote_defaults = TransportConfig::default();

        let default_provider = get("DEFAULT_PROVIDER")
          .and_then(|name| Provider::from_name(&name))
          .unwrap_or(defaults.default_provider);

        Settings
        {   openai_api_key: get("OPENAI_API_KEY")
          , anthropic_api_key: get("ANTHROPIC_API_KEY")
          , groq_api_key: get("GROQ_API_KEY")
          , openai_base_url: get("OPENAI_BASE_URL")
              .unwrap_or(defaults.openai_base_url)
          , anthropic_base_url: get("ANTHROPIC_BASE_URL")
              .unwrap_or(defaults.anthropic_base_url)
          , groq_base_url: get("GROQ_BASE_URL")
              .unwrap_or(defaults.groq_base_url)
          , default_provider
          , default_openai_model: get("DEFAULT_OPENAI_MODEL")
              .unwrap_or(defaults.default_openai_model)
          , default_anthropic_model: get("DEFAULT_ANTHROPIC_MODEL")
              .unwrap_or(defaults.default_anthropic_model)
          , default_groq_model: get("DEFAULT_GROQ_MODEL")
              .unwrap_or(defaults.default_groq_model)
          , request_timeout_secs: get("REQUEST_TIMEOUT_SECS")
              .and_then(|v| v.parse().ok())
              .unwrap_or(defaults.request_timeout_secs)
          , strategy_file: get("ASSET_STRATEGY_FILE")
              .map(PathBuf::from)
          , remote: TransportConfig
            {   host: get("REMOTE_HOST")
                  .unwrap_or(remote_defaults.host)
              , port: get("REMOTE_PORT")
                  .and_then(|v| v.parse().ok())
                  .unwrap_or(remote_defaults.port)
              , ..remote_defaults
            }
        }
    }

    /// Configured default model name for a provider
    pub fn default_model_for(&self, provider: Provider) -> &str
    {   match provider
        {   Provider::OpenAI => &self.default_openai_model
          , Provider::Anthropic => &self.default_anthropic_model
          , Provider::Groq => &self.default_groq_model
        }
    }

    /// Credential for a provider, if one is set and non-blank
    pub fn api_key_for(&self, provider: Provider) -> Option<&str>
    {   let key = match provider
        {   Provider::OpenAI => self.openai_api_key.as_deref()
          , Provider::Anthropic => self.anthropic_api_key.as_deref()
          , Provider::Groq => self.groq_api_key.as_deref()
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Providers that have a credential
    pub fn configured_providers(&self) -> Vec<Provider>
    {   Provider::ALL
          .into_iter()
          .filter(|p| self.api_key_for(*p).is_some())
          .collect()
    }

    pub fn request_timeout(&self) -> Duration
    {   Duration::from_secs(self.request_timeout_secs)
    }
}

fn redact(key: Option<&str>) -> &'static str
{   match key
    {   Some(_) => "<set>"
      , None => "<unset>"
    }
}

impl fmt::Debug for Settings
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("Settings")
          .field("openai_api_key", &redact(self.api_key_for(Provider::OpenAI)))
          .field("anthropic_api_key", &redact(self.api_key_for(Provider::Anthropic)))
          .field("groq_api_key", &redact(self.api_key_for(Provider::Groq)))
          .field("openai_base_url", &self.openai_base_url)
          .field("anthropic_base_url", &self.anthropic_base_url)
          .field("groq_base_url", &self.groq_base_url)
          .field("default_provider", &self.default_provider)
          .field("default_openai_model", &self.default_openai_model)
          .field("default_anthropic_model", &self.default_anthropic_model)
          .field("default_groq_model", &self.default_groq_model)
          .field("request_timeout_secs", &self.request_timeout_secs)
          .field("strategy_file", &self.strategy_file)
          .field("remote", &self.remote)
          .finish()
    }
}
