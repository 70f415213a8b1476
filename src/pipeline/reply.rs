//! Response interpreter
//!
//! Turns the model's raw text into a JSON document with the four required
//! top-level fields. Tolerates a fenced code block around the payload and a
//! reply cut off one closing brace short.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::error::Category;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const UPDATED_CBN: &str = "updated_cbn";
pub const TENTATIVE_SUGGESTIONS: &str = "tentative_suggestions";
pub const REFLECTION_PROMPTS: &str = "reflection_prompts";
pub const SUBCLAIMS: &str = "subclaims";

pub const REQUIRED_KEYS: [&str; 4] = [UPDATED_CBN, TENTATIVE_SUGGESTIONS, REFLECTION_PROMPTS, SUBCLAIMS];

const FENCE: &str = "```";

lazy_static! {
    static ref LANGUAGE_TAG: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_+-]*").unwrap();
}

#[derive(Debug, Error, PartialEq)]
pub enum ReplyError {
    #[error("unable to parse even partial JSON: {0}")]
    InvalidJson(String),
    #[error("Missing required key in AI response: {0}")]
    MissingKey(&'static str),
}

/// A reply that parsed and carries every required key.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub updated_cbn: Value,
    pub tentative_suggestions: Vec<String>,
    pub reflection_prompts: Vec<String>,
    pub subclaims: Vec<String>,
    /// Whether the partial-JSON repair was needed.
    pub repaired: bool,
}

/// Remove a leading code fence, its language tag and a closing fence.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return content;
    };
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    let body = match LANGUAGE_TAG.find(body) {
        Some(tag) if tag.as_str().eq_ignore_ascii_case("json") || is_tag_line(body, tag.end()) => &body[tag.end()..],
        _ => body,
    };
    body.trim()
}

/// A tag counts only when it stands alone on the fence line.
fn is_tag_line(body: &str, tag_end: usize) -> bool {
    body[tag_end..].chars().next().map_or(true, |c| c == '\n' || c == '\r')
}

/// Byte offset of a serde_json error within `text`, if it carries a position.
///
/// Points at the offending character, or at the end of `text` when the
/// input ran out.
pub fn error_offset(text: &str, err: &serde_json::Error) -> Option<usize> {
    if err.line() == 0 {
        return None;
    }
    if err.classify() == Category::Eof {
        return Some(text.len());
    }
    let line_start = if err.line() == 1 {
        0
    } else {
        text.match_indices('\n').nth(err.line() - 2).map(|(i, _)| i + 1)?
    };
    // Columns are 1-based.
    let mut offset = (line_start + err.column().saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    Some(offset)
}

/// Parse `content`, retrying once as `content[..error offset] + "}"`.
///
/// Returns the value and whether the repair was used.
pub fn parse_lenient(content: &str) -> Result<(Value, bool), ReplyError> {
    let err = match serde_json::from_str::<Value>(content) {
        Ok(value) => return Ok((value, false)),
        Err(err) => err,
    };
    warn!("Failed to parse complete JSON: {}", err);

    let offset = error_offset(content, &err).ok_or_else(|| ReplyError::InvalidJson(err.to_string()))?;
    let partial = format!("{}}}", &content[..offset]);
    match serde_json::from_str::<Value>(&partial) {
        Ok(value) => {
            info!("Successfully parsed partial JSON (truncated at byte {})", offset);
            Ok((value, true))
        }
        Err(retry) => Err(ReplyError::InvalidJson(retry.to_string())),
    }
}

/// Full interpretation of a raw reply.
pub fn interpret_reply(raw: &str) -> Result<ParsedReply, ReplyError> {
    let content = strip_code_fence(raw);
    let (value, repaired) = parse_lenient(content)?;
    info!("Successfully parsed AI model response");
    debug!("Parsed result: {}", serde_json::to_string_pretty(&value).unwrap_or_default());

    let mut obj = match value {
        Value::Object(obj) => obj,
        _ => return Err(ReplyError::MissingKey(UPDATED_CBN)),
    };
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !obj.contains_key(**key)) {
        return Err(ReplyError::MissingKey(*missing));
    }

    Ok(ParsedReply {
        updated_cbn: obj.remove(UPDATED_CBN).unwrap_or_default(),
        tentative_suggestions: advisory(&mut obj, TENTATIVE_SUGGESTIONS),
        reflection_prompts: advisory(&mut obj, REFLECTION_PROMPTS),
        subclaims: advisory(&mut obj, SUBCLAIMS),
        repaired,
    })
}

/// Advisory lists are opaque text; non-string items are kept as their JSON text.
fn advisory(obj: &mut Map<String, Value>, key: &str) -> Vec<String> {
    let as_text = |v: Value| match v {
        Value::String(s) => s,
        other => other.to_string(),
    };
    match obj.remove(key) {
        Some(Value::Array(items)) => items.into_iter().map(as_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![as_text(other)],
    }
}
