//! Selector resolution and script generation

use log::debug;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::extract::extract_code_block;
use crate::providers::{self, TextBackend};
use crate::request::{GenerationResult, ResolvedTarget};
use crate::Provider;

/// Model-family prefixes that imply a provider
const FAMILY_PREFIXES: [(&str, Provider); 3] = [
  ("claude", Provider::Anthropic)
, ("llama", Provider::Groq)
, ("mixtral", Provider::Groq)
];

/// Classify a selector.
///
/// An explicit `<provider>/` prefix wins, then a known model family,
/// then `default`. Pure and total.
pub fn choose_provider(selector: &str, default: Provider) -> Provider
{   let normalized = selector.trim().to_ascii_lowercase();

    for provider in Provider::ALL
    {   if normalized
          .strip_prefix(provider.as_str())
          .is_some_and(|rest| rest.starts_with('/'))
        {   return provider;
        }
    }

    FAMILY_PREFIXES
      .iter()
      .find(|(family, _)| normalized.starts_with(family))
      .map(|(_, provider)| *provider)
      .unwrap_or(default)
}

/// Resolve a selector to a concrete target. Never fails.
///
/// A selector containing `/` loses everything up to the first `/`.
/// Blank selectors, and selectors that leave no model name, fall back
/// to the configured default provider and its default model.
pub fn resolve_target(
  selector: Option<&str>
, settings: &Settings
) -> ResolvedTarget
{   let requested = selector.map(str::trim).unwrap_or("");

    if !requested.is_empty()
    {   let provider
          = choose_provider(requested, settings.default_provider);
        let model = match requested.split_once('/')
        {   Some((_, rest)) => rest.trim()
          , None => requested
        };
        if !model.is_empty()
        {   return ResolvedTarget
            {   provider
              , model: model.to_string()
            };
        }
    }

    let provider = settings.default_provider;
    ResolvedTarget
    {   provider
      , model: settings.default_model_for(provider).to_string()
    }
}

/// Trimmed prompt, or `InvalidInput` when nothing is left
pub fn validate_prompt(prompt: &str) -> Result<&str>
{   let prompt = prompt.trim();
    if prompt.is_empty()
    {   return Err(Error::InvalidInput(
          "Prompt cannot be empty".to_string()
        ));
    }
    Ok(prompt)
}

/// Turn a prompt into a script using the backend the selector names
pub async fn generate_script(
  prompt: &str
, selector: Option<&str>
, system_prompt: &str
, settings: &Settings
) -> Result<GenerationResult>
{   let target = resolve_target(selector, settings);
    debug!("Resolved target: {}", target.qualified_model());

    let backend = providers::backend_for(target.provider, settings)?;
    generate_with(backend.as_ref(), &target, prompt, system_prompt).await
}

/// Run one generation against an already-built backend.
/// The backend must belong to the target's provider.
pub async fn generate_with(
  backend: &dyn TextBackend
, target: &ResolvedTarget
, prompt: &str
, system_prompt: &str
) -> Result<GenerationResult>
{   if backend.provider() != target.provider
    {   return Err(Error::InvalidInput(format!(
          "{} backend cannot serve {}"
        , backend.provider(), target.qualified_model()
        )));
    }

    let text = backend
      .generate_text(&target.model, system_prompt, prompt)
      .await?;

    let code = extract_code_block(&text);
    if code.is_empty()
    {   return Err(Error::EmptyResponse(format!(
          "{} response contained no code.", target.provider
        )));
    }
    debug!("Extracted {} bytes of code", code.len());

    Ok(GenerationResult
    {   code
      , provider: target.provider
      , qualified_model: target.qualified_model()
    })
}
