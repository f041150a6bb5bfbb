//! System instruction sent ahead of every user prompt

use std::path::Path;
use log::debug;
use crate::config::Settings;

const BASE_INSTRUCTIONS: [&str; 5] = [
  "You are an expert Python automation engineer for production 3D workflows."
, "Return valid Python only. Do not include prose explanations."
, "Prefer safe, deterministic operations and preserve existing scene data when possible."
, "If assumptions are required, encode them in comments at the top of the script."
, "Output should be directly executable inside the remote application."
];

/// Join the fixed instructions, appending an optional strategy
pub fn build_system_prompt(strategy: Option<&str>) -> String
{   let mut parts: Vec<String> = BASE_INSTRUCTIONS
      .iter()
      .map(|s| s.to_string())
      .collect();

    if let Some(strategy) = strategy
      .map(str::trim)
      .filter(|s| !s.is_empty())
    {   parts.push(format!("Reference strategy:\n{}", strategy));
    }

    parts.join("\n\n")
}

/// Read a strategy file; missing or unreadable files yield `None`
pub fn load_strategy(path: &Path) -> Option<String>
{   match std::fs::read_to_string(path)
    {   Ok(text) => Some(text)
      , Err(e) => {
          debug!("Strategy file {} not loaded: {}", path.display(), e);
          None
        }
    }
}

pub fn system_prompt_for(settings: &Settings) -> String
{   let strategy = settings.strategy_file
      .as_deref()
      .and_then(load_strategy);
    build_system_prompt(strategy.as_deref())
}
