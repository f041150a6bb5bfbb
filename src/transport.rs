//! One framed request, one framed reply, over a fresh TCP connection.
//!
//! The remote application sends neither a length prefix nor a delimiter.
//! After every read the bytes received so far are parsed as a JSON
//! document and the first successful parse is the reply. A read that
//! idles past the deadline, or a closed stream, ends the reply; the
//! accumulated bytes then get one final parse attempt.

use std::time::Duration;
use log::{debug, trace};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::request::{
  CommandRequest, CommandResponse, ConnectionStatus, ScriptOutcome
};

const READ_CHUNK: usize = 8192;

pub const GET_SCENE_INFO: &str = "get_scene_info";
pub const EXECUTE_CODE: &str = "execute_code";

const UNKNOWN_REMOTE_ERROR: &str = "Unknown remote error";
const DEFAULT_EXECUTE_MESSAGE: &str
  = "Code executed in remote application.";

/// Send one command and wait for one reply.
///
/// The connection is opened for this call only and dropped on every
/// return path.
pub async fn send_command(
  config: &TransportConfig
, host: &str
, port: u16
, command_type: &str
, params: Map<String, Value>
) -> Result<CommandResponse>
{   let request = CommandRequest::new(command_type, params);
    let payload = serde_json::to_vec(&request)
      .map_err(|e| Error::ParseError(format!(
        "could not encode command: {}", e
      )))?;

    debug!("Connecting to {}:{} for {}", host, port, command_type);
    let mut stream = connect(config, host, port).await?;

    match timeout(config.write_timeout, stream.write_all(&payload)).await
    {   Ok(Ok(())) => {}
      , Ok(Err(e)) => {
          return Err(Error::TransportConnect(format!(
            "failed sending command to {}:{}: {}", host, port, e
          )));
        }
      , Err(_) => {
          return Err(Error::TransportConnect(format!(
            "timed out sending command to {}:{}", host, port
          )));
        }
    }
    trace!("Sent {} bytes", payload.len());

    let reply = read_reply(&mut stream, config.read_timeout).await?;
    let response = into_response(reply)?;

    if response.is_error()
    {   let message = response.message
          .clone()
          .filter(|m| !m.is_empty())
          .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string());
        return Err(Error::RemoteRejected(message));
    }

    Ok(response)
}

/// Ask the remote application to describe its current state
pub async fn get_scene_info(
  config: &TransportConfig
, host: &str
, port: u16
) -> Result<CommandResponse>
{   send_command(config, host, port, GET_SCENE_INFO, Map::new()).await
}

/// Deliver a script for execution.
/// Blank scripts are rejected before connecting.
pub async fn execute_script(
  config: &TransportConfig
, host: &str
, port: u16
, script: &str
) -> Result<ScriptOutcome>
{   if script.trim().is_empty()
    {   return Err(Error::InvalidInput(
          "Generated code is empty.".to_string()
        ));
    }

    let mut params = Map::new();
    params.insert("code".to_string(), json!(script));

    let response
      = send_command(config, host, port, EXECUTE_CODE, params).await?;

    Ok(ScriptOutcome
    {   message: response.message
          .unwrap_or_else(|| DEFAULT_EXECUTE_MESSAGE.to_string())
      , result: response.result
    })
}

/// Ping the remote application. Never fails; the outcome is
/// reported in the returned status.
pub async fn check_connection(
  config: &TransportConfig
, host: &str
, port: u16
) -> ConnectionStatus
{   let (connected, message)
      = match get_scene_info(config, host, port).await
        {   Ok(_) => (
              true
            , "Connected to remote application.".to_string()
            )
          , Err(e) => (
              false
            , format!("Remote application unavailable: {}", e)
            )
        };

    ConnectionStatus
    {   connected
      , host: host.to_string()
      , port
      , message
    }
}

async fn connect(
  config: &TransportConfig
, host: &str
, port: u16
) -> Result<TcpStream>
{   match timeout(config.connect_timeout, TcpStream::connect((host, port)))
      .await
    {   Ok(Ok(stream)) => Ok(stream)
      , Ok(Err(e)) => Err(Error::TransportConnect(format!(
          "could not connect to {}:{}: {}", host, port, e
        )))
      , Err(_) => Err(Error::TransportConnect(format!(
          "could not connect to {}:{}: timed out after {:?}"
        , host, port, config.connect_timeout
        )))
    }
}

/// Accumulate reads until the buffer parses as one JSON document,
/// the stream closes, or a read idles past `read_timeout`.
async fn read_reply(
  stream: &mut TcpStream
, read_timeout: Duration
) -> Result<Value>
{   let mut received: Vec<u8> = Vec::new();
    let mut buffer = [0_u8; READ_CHUNK];

    loop
    {   match timeout(read_timeout, stream.read(&mut buffer)).await
        {   Err(_) => {
              if received.is_empty()
              {   return Err(Error::TransportTimeout(format!(
                    "no response within {:?}", read_timeout
                  )));
              }
              debug!(
                "Read idle after {} bytes, treating as end of reply"
              , received.len()
              );
              break;
            }
          , Ok(Ok(0)) => {
              trace!("Remote closed after {} bytes", received.len());
              break;
            }
          , Ok(Ok(read_len)) => {
              received.extend_from_slice(&buffer[..read_len]);
              trace!("Read {} bytes ({} total)", read_len, received.len());
              if let Ok(value)
                = serde_json::from_slice::<Value>(&received)
              {   return Ok(value);
              }
            }
          , Ok(Err(e)) => {
              return Err(Error::TransportConnect(format!(
                "failed reading response: {}", e
              )));
            }
        }
    }

    if received.is_empty()
    {   return Err(Error::TransportParse(
          "no response received".to_string()
        ));
    }

    serde_json::from_slice::<Value>(&received)
      .map_err(|e| Error::TransportParse(format!(
        "response was not valid JSON: {}", e
      )))
}

fn into_response(value: Value) -> Result<CommandResponse>
{   if !value.is_object()
    {   return Err(Error::TransportParse(
          "response was not a JSON object".to_string()
        ));
    }
    serde_json::from_value(value)
      .map_err(|e| Error::TransportParse(e.to_string()))
}
