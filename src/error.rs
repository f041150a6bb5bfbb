use std::fmt;

/// Custom error type for remote-brain operations
/// Implements Clone so results can move between tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Could not reach the remote application, or the
    /// connection failed while the request was in flight
    TransportConnect(String)
  , /// Read timed out before a single byte arrived
    TransportTimeout(String)
  , /// Reply bytes never formed a JSON object
    TransportParse(String)
  , /// Remote answered with `status == "error"`
    RemoteRejected(String)
  , /// Required credential or setting is missing
    Configuration(String)
  , /// Backend replied without usable text
    EmptyResponse(String)
  , /// Caller input rejected before any network activity
    InvalidInput(String)
  , /// Outbound HTTP request to a backend failed
    HttpError(String)
  , /// Backend returned a non-success status
    ApiError(String)
  , /// JSON could not be encoded, or a backend body decoded
    ParseError(String)
}

/// Coarse classification used by callers to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   /// Caller must fix its input or configuration
    Client
  , /// The remote application failed or could not be reached
    Gateway
  , /// Backend call failed outright, or an internal fault
    Internal
}

impl ErrorKind
{   /// Process exit status the CLI reports for this kind
    pub fn exit_code(self) -> u8
    {   match self
        {   ErrorKind::Client => 2
          , ErrorKind::Gateway => 3
          , ErrorKind::Internal => 1
        }
    }
}

impl Error
{   pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::Configuration(_)
          | Error::InvalidInput(_)
          | Error::EmptyResponse(_) => ErrorKind::Client
          , Error::TransportConnect(_)
          | Error::TransportTimeout(_)
          | Error::TransportParse(_)
          | Error::RemoteRejected(_) => ErrorKind::Gateway
          , Error::HttpError(_)
          | Error::ApiError(_)
          | Error::ParseError(_) => ErrorKind::Internal
        }
    }

    /// True for failures raised while talking to the remote application
    pub fn is_transport(&self) -> bool
    {   matches!(
          self
        , Error::TransportConnect(_)
          | Error::TransportTimeout(_)
          | Error::TransportParse(_)
          | Error::RemoteRejected(_)
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::TransportConnect(msg) => {
              write!(f, "Connection error: {}", msg)
            }
          , Error::TransportTimeout(msg) => {
              write!(f, "Timed out: {}", msg)
            }
          , Error::TransportParse(msg) => {
              write!(f, "Invalid response: {}", msg)
            }
          , Error::RemoteRejected(msg) => {
              write!(f, "{}", msg)
            }
          , Error::Configuration(msg) => {
              write!(f, "{}", msg)
            }
          , Error::EmptyResponse(msg) => {
              write!(f, "{}", msg)
            }
          , Error::InvalidInput(msg) => {
              write!(f, "{}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
