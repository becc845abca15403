//! Domain model: the canonical quiz question produced by normalization.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when the model gives no question text.
pub const NO_QUESTION: &str = "No question provided";
/// Category used when neither the item nor the run supplies one.
pub const DEFAULT_CATEGORY: &str = "general";
/// Options used when the item carries none.
pub const PLACEHOLDER_OPTIONS: [&str; 4] = ["A", "B", "C", "D"];

/// One multiple-choice question, fully populated.
///
/// Serialized field names match the documents stored in MongoDB
/// (`qid`, `question`, ...). Always `options.len() >= 1` and
/// `correct_index < options.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
  #[serde(rename = "qid")]
  pub id: String,
  #[serde(rename = "question")]
  pub question_text: String,
  pub category: String,
  pub options: Vec<String>,
  pub correct_index: usize,
  pub backstory: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  pub created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  pub updated_at: DateTime<Utc>,
}

impl QuestionRecord {
  /// Text of the option marked correct.
  pub fn correct_option(&self) -> &str {
    self.options.get(self.correct_index).map(String::as_str).unwrap_or_default()
  }
}
