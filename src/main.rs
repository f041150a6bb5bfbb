use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use serde_json::{json, Value};
use remote_brain::prompt::system_prompt_for;
use remote_brain::{
  check_connection, execute_script, generate_script, get_scene_info
, validate_prompt, Error, ErrorKind, GenerationResult, Settings
};

#[derive(Parser)]
#[command(
  name = "remote-brain"
, version
, about = "Generate automation scripts and run them in a remote application"
)]
struct Cli
{   #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command
{   /// Generate a script from a prompt and print it
    Generate(GenerateArgs)
  , /// Generate a script and execute it remotely
    Apply
    {   #[command(flatten)]
        generate: GenerateArgs
      , #[command(flatten)]
        remote: RemoteArgs
    }
  , /// Execute an existing script file remotely
    Run
    {   #[arg(long)]
        file: PathBuf
      , #[command(flatten)]
        remote: RemoteArgs
    }
  , /// Describe the remote application's current state
    Scene(RemoteArgs)
  , /// Report configured providers and remote reachability
    Status(RemoteArgs)
}

#[derive(Args)]
struct GenerateArgs
{   /// Natural-language instruction
    #[arg(long)]
    prompt: String
  , /// `<provider>/<model>`, a model name, or nothing for the default
    #[arg(long)]
    model: Option<String>
}

#[derive(Args)]
struct RemoteArgs
{   #[arg(long)]
    host: Option<String>
  , #[arg(long)]
    port: Option<u16>
}

impl RemoteArgs
{   fn endpoint(&self, settings: &Settings) -> (String, u16)
    {   (
          self.host.clone().unwrap_or_else(|| settings.remote.host.clone())
        , self.port.unwrap_or(settings.remote.port)
        )
    }
}

/// Failure surfaced by the CLI itself or by the library
enum CliError
{   Core(Error)
  , Internal(String)
}

impl From<Error> for CliError
{   fn from(e: Error) -> Self
    {   CliError::Core(e)
    }
}

impl CliError
{   fn exit_code(&self) -> u8
    {   match self
        {   CliError::Core(e) => e.kind().exit_code()
          , CliError::Internal(_) => ErrorKind::Internal.exit_code()
        }
    }

    fn message(&self) -> String
    {   match self
        {   CliError::Core(e) if e.is_transport()
              => format!("Remote delivery failed: {}", e)
          , CliError::Core(e) if e.kind() == ErrorKind::Internal
              => format!("Generation failed: {}", e)
          , CliError::Core(e) => e.to_string()
          , CliError::Internal(msg) => msg.clone()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    debug!("Settings: {:?}", settings);

    match run(cli.command, &settings).await
    {   Ok(output) => {
          match serde_json::to_string_pretty(&output)
          {   Ok(text) => println!("{}", text)
            , Err(e) => {
                error!("Could not render output: {}", e);
                return ExitCode::from(1);
              }
          }
          ExitCode::SUCCESS
        }
      , Err(e) => {
          error!("{}", e.message());
          ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: Command, settings: &Settings)
  -> Result<Value, CliError>
{   match command
    {   Command::Generate(args) => {
          let generated = generate(&args, settings).await?;
          Ok(generation_json(&generated))
        }
      , Command::Apply { generate: args, remote } => {
          let generated = generate(&args, settings).await?;
          let (host, port) = remote.endpoint(settings);
          info!("Executing generated script on {}:{}", host, port);
          let outcome = execute_script(
            &settings.remote, &host, port, &generated.code
          ).await?;
          Ok(json!({
            "generation": generation_json(&generated)
          , "message": outcome.message
          , "result": outcome.result
          }))
        }
      , Command::Run { file, remote } => {
          let code = std::fs::read_to_string(&file)
            .map_err(|e| CliError::Internal(format!(
              "Could not read {}: {}", file.display(), e
            )))?;
          let (host, port) = remote.endpoint(settings);
          let outcome
            = execute_script(&settings.remote, &host, port, &code).await?;
          Ok(json!({
            "message": outcome.message
          , "result": outcome.result
          }))
        }
      , Command::Scene(remote) => {
          let (host, port) = remote.endpoint(settings);
          let response
            = get_scene_info(&settings.remote, &host, port).await?;
          Ok(json!(response))
        }
      , Command::Status(remote) => {
          let (host, port) = remote.endpoint(settings);
          let connection
            = check_connection(&settings.remote, &host, port).await;
          let default_provider = settings.default_provider;
          Ok(json!({
            "status": "ok"
          , "providers": settings.configured_providers()
          , "default_provider": default_provider
          , "default_model": settings.default_model_for(default_provider)
          , "remote": connection
          }))
        }
    }
}

async fn generate(args: &GenerateArgs, settings: &Settings)
  -> Result<GenerationResult, CliError>
{   let prompt = validate_prompt(&args.prompt)?;

    let system_prompt = system_prompt_for(settings);
    let result = generate_script(
      prompt
    , args.model.as_deref()
    , &system_prompt
    , settings
    ).await?;

    info!("Generated script with {}", result.qualified_model);
    Ok(result)
}

fn generation_json(result: &GenerationResult) -> Value
{   json!({
      "python_code": result.code
    , "provider": result.provider
    , "model": result.qualified_model
    })
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn test_exit_codes_follow_error_kind()
    {   let cases = [
          (Error::Configuration("k".to_string()), 2)
        , (Error::EmptyResponse("e".to_string()), 2)
        , (Error::RemoteRejected("boom".to_string()), 3)
        , (Error::ApiError("429".to_string()), 1)
        ];
        for (err, code) in cases
        {   assert_eq!(CliError::from(err).exit_code(), code);
        }
        assert_eq!(CliError::Internal("io".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_messages_name_the_failing_stage()
    {   let delivery = CliError::from(Error::RemoteRejected("boom".to_string()));
        assert_eq!(delivery.message(), "Remote delivery failed: boom");

        let backend = CliError::from(Error::HttpError("reset".to_string()));
        assert_eq!(backend.message(), "Generation failed: HTTP error: reset");

        let client = CliError::from(Error::EmptyResponse(
          "Groq response was empty.".to_string()
        ));
        assert_eq!(client.message(), "Groq response was empty.");
    }
}
