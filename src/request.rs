//! Request and response types shared by the transport and the dispatcher

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One command sent to the remote application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest
{   /// Command name, e.g. "get_scene_info"
    #[serde(rename = "type")]
    pub command_type: String
  , /// Command-specific parameters, opaque to the transport
    pub params: Map<String, Value>
}

impl CommandRequest
{   pub fn new(
      command_type: impl Into<String>
    , params: Map<String, Value>
    ) -> Self
    {   CommandRequest
        {   command_type: command_type.into()
          , params
        }
    }
}

/// Reply from the remote application.
/// Only `status == "error"` is treated as failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandResponse
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>
  , /// Anything else the remote sent, e.g. an error payload
    #[serde(flatten)]
    pub extra: Map<String, Value>
}

impl CommandResponse
{   pub fn is_error(&self) -> bool
    {   self.status.as_deref() == Some("error")
    }
}

/// What a script execution reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutcome
{   pub message: String
  , pub result: Option<Value>
}

/// Reachability report for the remote application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus
{   pub connected: bool
  , pub host: String
  , pub port: u16
  , pub message: String
}

/// Concrete (provider, model) pair a selector resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget
{   pub provider: crate::Provider
  , pub model: String
}

impl ResolvedTarget
{   /// `<provider>/<model>`
    pub fn qualified_model(&self) -> String
    {   format!("{}/{}", self.provider, self.model)
    }
}

/// Normalized output of one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult
{   /// Extracted script, never empty
    pub code: String
  , pub provider: crate::Provider
  , pub qualified_model: String
}

/// One turn of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}
