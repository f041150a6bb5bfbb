pub mod error;
pub mod config;
pub mod request;
pub mod transport;
pub mod extract;
pub mod prompt;
pub mod providers;
pub mod dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/*

remote-brain turns a natural-language instruction into an automation
script with one of several text-generation backends, and can deliver
that script to a long-lived remote application over a plain TCP socket.

remote-brain/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and Provider
│   ├── main.rs         # CLI standing in for the route layer
│   ├── error.rs        # Error enum and ErrorKind
│   ├── config.rs       # Settings snapshot, TransportConfig
│   ├── request.rs      # Command / generation types
│   ├── transport.rs    # One framed request, one framed reply
│   ├── extract.rs      # Fenced-block extraction
│   ├── prompt.rs       # System instruction
│   ├── dispatch.rs     # Selector -> (provider, model) -> script
│   └── providers/      # One TextBackend per provider
│       ├── mod.rs
│       ├── openai.rs
│       ├── anthropic.rs
│       └── groq.rs
└── tests/

*/

pub use config::{Settings, TransportConfig};
pub use dispatch::{
  choose_provider, generate_script, resolve_target, validate_prompt
};
pub use error::{Error, ErrorKind, Result};
pub use extract::extract_code_block;
pub use request::{
  CommandRequest, CommandResponse, ConnectionStatus
, GenerationResult, ResolvedTarget, ScriptOutcome
};
pub use transport::{
  check_connection, execute_script, get_scene_info, send_command
};

/// Text-generation providers a selector can resolve to.
///
/// Classification order matters: the declaration order below is the
/// order in which `<provider>/` prefixes are tried.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash
)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{   /// Groq (OpenAI-compatible chat completions; Llama, Mixtral)
    Groq
  , /// OpenAI (Responses API)
    OpenAI
  , /// Anthropic (Claude models, Messages API)
    Anthropic
}

impl Provider
{   /// Prefix-match priority order
    pub const ALL: [Provider; 3]
      = [Provider::Groq, Provider::OpenAI, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Provider::Groq => "groq"
          , Provider::OpenAI => "openai"
          , Provider::Anthropic => "anthropic"
        }
    }

    /// Case-insensitive lookup by canonical name
    pub fn from_name(name: &str) -> Option<Provider>
    {   let wanted = name.trim().to_ascii_lowercase();
        Provider::ALL
          .into_iter()
          .find(|p| p.as_str() == wanted)
    }
}

impl fmt::Display for Provider
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}
