//! Turning a whole model reply into an ordered list of questions.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::domain::QuestionRecord;
use crate::extract::extract_json_array;
use crate::normalize::normalize_item;
use crate::util::trunc_for_log;

/// The reply could not be turned into any records. Carries the extracted
/// text verbatim so the caller can show what the model actually said.
#[derive(Debug, thiserror::Error)]
pub enum MalformedReplyError {
  #[error("reply is not valid JSON: {source}")]
  InvalidJson {
    text: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("reply is JSON but not an array (found {found})")]
  NotASequence { text: String, found: &'static str },
}

impl MalformedReplyError {
  /// The extracted text that failed to parse.
  pub fn text(&self) -> &str {
    match self {
      Self::InvalidJson { text, .. } | Self::NotASequence { text, .. } => text,
    }
  }
}

/// Extract, parse and normalize every item of `raw`, keeping source order.
/// Malformed items get defaults; only an unparseable or non-array reply fails.
#[instrument(level = "info", skip(raw, topic), fields(raw_len = raw.len()))]
pub fn process_reply(raw: &str, topic: &str, id_base: u64) -> Result<Vec<QuestionRecord>, MalformedReplyError> {
  let text = extract_json_array(raw);
  debug!(extracted_len = text.len(), preview = %trunc_for_log(text, 120), "Extracted candidate JSON");

  let parsed: Value = serde_json::from_str(text).map_err(|source| MalformedReplyError::InvalidJson {
    text: text.to_string(),
    source,
  })?;

  let items = match parsed {
    Value::Array(items) => items,
    other => {
      return Err(MalformedReplyError::NotASequence { text: text.to_string(), found: kind_of(&other) });
    }
  };

  let records: Vec<QuestionRecord> = items
    .iter()
    .enumerate()
    .map(|(i, item)| normalize_item(item, topic, i + 1, id_base))
    .collect();

  info!(count = records.len(), "Normalized quiz items");
  Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
