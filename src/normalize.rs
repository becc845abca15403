//! Mapping one loosely-typed model item onto a `QuestionRecord`.
//!
//! Models have answered in several shapes over time:
//!   - `{q, correctans, ans1, ans2, ans3, backstory}`
//!   - `{qid, question, category, options, correct_index, backstory}`
//!   - mixes of both, plus `answer`/`correct`/`explanation` variants.
//!
//! Each logical field has an ordered key list; the first usable value wins.
//! Every field has a default, so normalization never fails.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{QuestionRecord, DEFAULT_CATEGORY, NO_QUESTION, PLACEHOLDER_OPTIONS};

pub const QUESTION_KEYS: &[&str] = &["question", "q", "prompt"];
pub const CATEGORY_KEYS: &[&str] = &["category", "cat"];
pub const ANSWER_KEYS: &[&str] = &["correctans", "answer", "correct"];
pub const BACKSTORY_KEYS: &[&str] = &["backstory", "explanation"];
pub const OPTION_SLOT_KEYS: &[&str] = &["ans1", "ans2", "ans3", "ans4", "ans5"];

const OPTIONS_KEY: &str = "options";
const INDEX_KEY: &str = "correct_index";
const ID_KEY: &str = "qid";

const ANSWER_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E'];

/// Normalize one item, stamping it with the current time.
pub fn normalize_item(item: &Value, topic: &str, position: usize, id_base: u64) -> QuestionRecord {
  normalize_item_at(item, topic, position, id_base, Utc::now())
}

/// Normalize one item with an explicit timestamp.
///
/// `position` is 1-based; the fallback id is `q{id_base + position - 1}`.
/// Non-object items normalize as an empty mapping.
pub fn normalize_item_at(
  item: &Value,
  topic: &str,
  position: usize,
  id_base: u64,
  now: DateTime<Utc>,
) -> QuestionRecord {
  let empty = Map::new();
  let fields = item.as_object().unwrap_or(&empty);

  let question_text = first_text(fields, QUESTION_KEYS).unwrap_or_else(|| NO_QUESTION.to_string());

  let category = first_text(fields, CATEGORY_KEYS)
    .or_else(|| (!topic.is_empty()).then(|| topic.to_string()))
    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

  let options = resolve_options(fields);
  let correct_index = resolve_correct_index(fields, &options);

  let backstory = first_text(fields, BACKSTORY_KEYS).unwrap_or_default();

  let id = text_at(fields, ID_KEY).unwrap_or_else(|| {
    let offset = u64::try_from(position.saturating_sub(1)).unwrap_or(u64::MAX);
    let seq = id_base.saturating_add(offset);
    format!("q{seq}")
  });

  QuestionRecord {
    id,
    question_text,
    category,
    options,
    correct_index,
    backstory,
    created_at: now,
    updated_at: now,
  }
}

/// Scalar value as non-empty text. Strings and numbers count; `null`,
/// booleans, empty strings and containers do not.
fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn text_at(fields: &Map<String, Value>, key: &str) -> Option<String> {
  fields.get(key).and_then(as_text)
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| text_at(fields, k))
}

/// Explicit `options` array first, then `ans1..ans5`, then the placeholders.
fn resolve_options(fields: &Map<String, Value>) -> Vec<String> {
  let explicit: Vec<String> = fields
    .get(OPTIONS_KEY)
    .and_then(Value::as_array)
    .map(|arr| arr.iter().filter_map(as_text).collect())
    .unwrap_or_default();
  if !explicit.is_empty() {
    return explicit;
  }

  let slots: Vec<String> = OPTION_SLOT_KEYS.iter().filter_map(|k| text_at(fields, k)).collect();
  if !slots.is_empty() {
    return slots;
  }

  PLACEHOLDER_OPTIONS.iter().map(|s| s.to_string()).collect()
}

/// Integer `correct_index` wins; otherwise the first answer field is read as a
/// letter code or matched against the option texts. Out of range means 0.
fn resolve_correct_index(fields: &Map<String, Value>, options: &[String]) -> usize {
  let resolved = match fields.get(INDEX_KEY).and_then(integer_index) {
    Some(idx) => idx,
    None => first_text(fields, ANSWER_KEYS).and_then(|answer| index_from_answer(&answer, options)),
  };

  match resolved {
    Some(idx) if idx < options.len() => idx,
    _ => 0,
  }
}

/// `Some` for any JSON integer; the inner value is `None` when it cannot be a
/// `usize` (negative or too large).
fn integer_index(value: &Value) -> Option<Option<usize>> {
  if let Some(n) = value.as_u64() {
    Some(usize::try_from(n).ok())
  } else if value.is_i64() {
    Some(None)
  } else {
    None
  }
}

fn index_from_answer(answer: &str, options: &[String]) -> Option<usize> {
  if let Some(idx) = letter_index(answer) {
    return Some(idx);
  }
  options.iter().position(|opt| opt == answer)
}

fn letter_index(answer: &str) -> Option<usize> {
  let mut chars = answer.trim().chars();
  let letter = chars.next()?.to_ascii_uppercase();
  if chars.next().is_some() {
    return None;
  }
  ANSWER_LETTERS.iter().position(|&l| l == letter)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn norm(item: Value) -> QuestionRecord {
    normalize_item(&item, "geography", 1, 100)
  }

  fn assert_invariant(rec: &QuestionRecord) {
    assert!(!rec.options.is_empty());
    assert!(rec.correct_index < rec.options.len());
    assert!(!rec.id.is_empty());
    assert!(!rec.question_text.is_empty());
    assert!(!rec.category.is_empty());
    assert_eq!(rec.created_at, rec.updated_at);
  }

  #[test]
  fn empty_mapping_gets_every_default() {
    let rec = normalize_item(&json!({}), "", 1, 100);
    assert_invariant(&rec);
    assert_eq!(rec.id, "q100");
    assert_eq!(rec.question_text, NO_QUESTION);
    assert_eq!(rec.category, DEFAULT_CATEGORY);
    assert_eq!(rec.options, vec!["A", "B", "C", "D"]);
    assert_eq!(rec.correct_index, 0);
    assert_eq!(rec.backstory, "");
  }

  #[test]
  fn non_object_items_normalize_like_empty_mappings() {
    for item in [json!(null), json!(42), json!("text"), json!([1, 2])] {
      let rec = norm(item);
      assert_invariant(&rec);
      assert_eq!(rec.question_text, NO_QUESTION);
      assert_eq!(rec.category, "geography");
    }
  }

  #[test]
  fn letter_answer_maps_to_index() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correctans": "B"}));
    assert_eq!(rec.correct_index, 1);
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "answer": " c "}));
    assert_eq!(rec.correct_index, 2);
  }

  #[test]
  fn literal_answer_is_looked_up_in_options() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correctans": "Rome"}));
    assert_eq!(rec.correct_index, 2);
  }

  #[test]
  fn unknown_answer_defaults_to_zero() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct": "Berlin"}));
    assert_eq!(rec.correct_index, 0);
  }

  #[test]
  fn letter_beyond_options_defaults_to_zero() {
    let rec = norm(json!({"ans1": "X", "ans2": "Y", "correctans": "E"}));
    assert_eq!(rec.correct_index, 0);
  }

  #[test]
  fn out_of_range_integer_index_defaults_to_zero() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": 9}));
    assert_eq!(rec.correct_index, 0);
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": -1, "answer": "Rome"}));
    assert_eq!(rec.correct_index, 0);
  }

  #[test]
  fn huge_integer_index_defaults_to_zero_without_answer_lookup() {
    let item: Value =
      serde_json::from_str(r#"{"options":["Paris","London","Rome"],"correct_index":18446744073709551615,"correctans":"B"}"#)
        .expect("json");
    assert_eq!(norm(item).correct_index, 0);
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": i64::MIN, "correctans": "B"}));
    assert_eq!(rec.correct_index, 0);
  }

  #[test]
  fn integer_index_wins_over_answer_fields() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": 2, "correctans": "A"}));
    assert_eq!(rec.correct_index, 2);
  }

  #[test]
  fn mistyped_integer_index_falls_back_to_answer() {
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": "2", "answer": "London"}));
    assert_eq!(rec.correct_index, 1);
    let rec = norm(json!({"options": ["Paris", "London", "Rome"], "correct_index": 1.5}));
    assert_eq!(rec.correct_index, 0);
  }

  #[test]
  fn numbered_answers_fill_options() {
    let rec = norm(json!({"ans1": "X", "ans2": "Y"}));
    assert_eq!(rec.options, vec!["X", "Y"]);
  }

  #[test]
  fn numbered_answers_skip_empty_slots() {
    let rec = norm(json!({"ans1": "X", "ans2": "", "ans3": null, "ans5": "Z", "ans6": "ignored"}));
    assert_eq!(rec.options, vec!["X", "Z"]);
  }

  #[test]
  fn explicit_options_win_over_numbered_answers() {
    let rec = norm(json!({"options": ["P", "Q"], "ans1": "X"}));
    assert_eq!(rec.options, vec!["P", "Q"]);
    let rec = norm(json!({"options": [], "ans1": "X"}));
    assert_eq!(rec.options, vec!["X"]);
  }

  #[test]
  fn numeric_values_are_rendered_as_text() {
    let rec = norm(json!({"options": [4, 5], "answer": 5, "qid": 7}));
    assert_eq!(rec.options, vec!["4", "5"]);
    assert_eq!(rec.correct_index, 1);
    assert_eq!(rec.id, "7");
  }

  #[test]
  fn field_name_fallbacks_apply_in_order() {
    let rec = norm(json!({
      "prompt": "third choice",
      "q": "second choice",
      "cat": "history",
      "explanation": "because",
    }));
    assert_eq!(rec.question_text, "second choice");
    assert_eq!(rec.category, "history");
    assert_eq!(rec.backstory, "because");

    let rec = norm(json!({"question": "first", "q": "second", "category": "", "cat": "history"}));
    assert_eq!(rec.question_text, "first");
    assert_eq!(rec.category, "history");
  }

  #[test]
  fn category_falls_back_to_topic() {
    let rec = norm(json!({"q": "x"}));
    assert_eq!(rec.category, "geography");
  }

  #[test]
  fn sequential_ids_follow_position_and_base() {
    let now = Utc::now();
    assert_eq!(normalize_item_at(&json!({}), "t", 1, 100, now).id, "q100");
    assert_eq!(normalize_item_at(&json!({}), "t", 3, 100, now).id, "q102");
    assert_eq!(normalize_item_at(&json!({}), "t", 1, 0, now).id, "q0");
    assert_eq!(normalize_item_at(&json!({"qid": "custom"}), "t", 3, 100, now).id, "custom");
  }

  #[test]
  fn sequential_ids_saturate_at_the_top_of_the_range() {
    let now = Utc::now();
    assert_eq!(normalize_item_at(&json!({}), "t", 2, u64::MAX, now).id, format!("q{}", u64::MAX));
    assert_eq!(normalize_item(&json!({}), "t", 0, 100).id, "q100");
  }

  #[test]
  fn same_inputs_give_same_record() {
    let now = Utc::now();
    let item = json!({"q": "2+2?", "ans1": "4", "ans2": "5", "correctans": "A"});
    assert_eq!(
      normalize_item_at(&item, "math", 2, 100, now),
      normalize_item_at(&item, "math", 2, 100, now)
    );
  }
}
