//! Pull the script out of a free-form model reply

const FENCE: &str = "```";
const SOURCE_FENCE: &str = "```python";

/// Extract source text from a model reply.
///
/// - No fence at all: the whole reply, trimmed.
/// - A ```` ```python ```` fence (any case) wins over other fences;
///   otherwise the first fence of any kind is used.
/// - An opening fence without a closing one: the whole reply, trimmed.
pub fn extract_code_block(text: &str) -> String
{   if !text.contains(FENCE)
    {   return text.trim().to_string();
    }

    // ASCII lowering keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let start = match lowered.find(SOURCE_FENCE)
    {   Some(pos) => pos + SOURCE_FENCE.len()
      , None => match lowered.find(FENCE)
        {   Some(pos) => pos + FENCE.len()
          , None => return text.trim().to_string()
        }
    };

    match lowered[start..].find(FENCE)
    {   Some(len) => text[start..start + len].trim().to_string()
      , None => text.trim().to_string()
    }
}
