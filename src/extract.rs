//! Locating the JSON array inside a free-form model reply.
//!
//! Models wrap structured output in code fences and prose despite being told
//! not to. We strip a leading/trailing fence and then take the greedy span from
//! the first `[` to the last `]`. The span can over-capture when the prose holds
//! stray brackets; the parser downstream reports that as a malformed reply.

const FENCE: &str = "```";
const FENCE_JSON: &str = "```json";

/// Best-effort JSON array text from a raw reply. Never fails; the result
/// is not guaranteed to parse.
pub fn extract_json_array(raw: &str) -> &str {
  let text = strip_fences(raw.trim());

  match (text.find('['), text.rfind(']')) {
    (Some(start), Some(end)) if start < end => &text[start..=end],
    _ => text,
  }
}

fn strip_fences(text: &str) -> &str {
  let text = text
    .strip_prefix(FENCE_JSON)
    .or_else(|| text.strip_prefix(FENCE))
    .unwrap_or(text);
  text.strip_suffix(FENCE).unwrap_or(text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fenced_json_yields_inner_array() {
    let raw = "```json\n[{\"q\": \"2+2?\"}]\n```";
    assert_eq!(extract_json_array(raw), "[{\"q\": \"2+2?\"}]");
  }

  #[test]
  fn untagged_fence_is_stripped_too() {
    let raw = "  ```\n[1, 2]\n```  \n";
    assert_eq!(extract_json_array(raw), "[1, 2]");
  }

  #[test]
  fn surrounding_prose_is_dropped() {
    let raw = "Here is your quiz:\n[{\"q\": \"a\"}, {\"q\": \"b\"}]\nEnjoy!";
    assert_eq!(extract_json_array(raw), "[{\"q\": \"a\"}, {\"q\": \"b\"}]");
  }

  #[test]
  fn span_is_greedy_across_stray_brackets() {
    let raw = "[note] data: [1] and [2]";
    assert_eq!(extract_json_array(raw), "[note] data: [1] and [2]");
  }

  #[test]
  fn no_brackets_returns_trimmed_text() {
    assert_eq!(extract_json_array("  not json at all \n"), "not json at all");
  }

  #[test]
  fn reversed_brackets_return_trimmed_text() {
    assert_eq!(extract_json_array(" ] then [ "), "] then [");
  }

  #[test]
  fn fence_without_array_keeps_inner_text() {
    assert_eq!(extract_json_array("```json\n{\"a\": 1}\n```").trim(), "{\"a\": 1}");
  }
}
