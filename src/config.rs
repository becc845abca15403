//! Runtime settings (environment) and prompt templates (optional TOML).
//!
//! Env variables (a `.env` file is loaded first when present):
//!   GOOGLE_API_KEY       : required
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com"
//!   GEMINI_MODEL         : default "gemini-2.5-pro"
//!   GEMINI_TIMEOUT_SECS  : default 180
//!   QUIZ_QUESTION_COUNT  : default 40
//!   QUIZ_ID_BASE         : first generated qid number, default 100
//!   MONGODB_URI          : enables persistence if present
//!   MONGODB_DB           : default "gemini_quiz_db"
//!   MONGODB_COLLECTION   : default "quizzes"
//!   QUIZ_CONFIG_PATH     : path to TOML with a [prompts] table

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_QUESTION_COUNT: u32 = 40;
pub const DEFAULT_ID_BASE: u64 = 100;
pub const DEFAULT_DB: &str = "gemini_quiz_db";
pub const DEFAULT_COLLECTION: &str = "quizzes";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("GOOGLE_API_KEY is not set")]
  MissingApiKey,
}

/// Model endpoint settings.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub timeout_secs: u64,
}

/// Where to write the quiz. Only built when MONGODB_URI is set.
#[derive(Clone, Debug)]
pub struct MongoSettings {
  pub uri: String,
  pub database: String,
  pub collection: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
  pub gemini: GeminiSettings,
  pub mongo: Option<MongoSettings>,
  pub question_count: u32,
  pub id_base: u64,
  pub prompts: Prompts,
}

impl Settings {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build settings from any key lookup; empty values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

    let api_key = get("GOOGLE_API_KEY").ok_or(ConfigError::MissingApiKey)?;
    let gemini = GeminiSettings {
      api_key,
      base_url: get_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
      model: get_or("GEMINI_MODEL", DEFAULT_MODEL),
      timeout_secs: parse_or(get("GEMINI_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS),
    };

    let mongo = get("MONGODB_URI").map(|uri| MongoSettings {
      uri,
      database: get_or("MONGODB_DB", DEFAULT_DB),
      collection: get_or("MONGODB_COLLECTION", DEFAULT_COLLECTION),
    });

    let prompts = get("QUIZ_CONFIG_PATH")
      .and_then(|path| load_quiz_config(Path::new(&path)))
      .map(|cfg| cfg.prompts)
      .unwrap_or_default();

    Ok(Self {
      gemini,
      mongo,
      question_count: parse_or(get("QUIZ_QUESTION_COUNT"), DEFAULT_QUESTION_COUNT),
      id_base: parse_or(get("QUIZ_ID_BASE"), DEFAULT_ID_BASE),
      prompts,
    })
  }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
  value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt templates. `{topic}` and `{count}` are substituted in the user template.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub quiz_system: String,
  pub quiz_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are a quiz author. Respond ONLY with strict JSON.".into(),
      quiz_user_template: "Generate a quiz set of {count} questions about '{topic}' in strict JSON format. \
        Return a JSON array where each item is an object with these fields: \
        \"qid\" (string), \"question\" (string), \"category\" (string), \
        \"options\" (array of strings), \"correct_index\" (integer index into options), \
        \"backstory\" (string). Return only the JSON array, no extra text or code blocks."
        .into(),
    }
  }
}

/// Load `QuizConfig` from a TOML file. On any IO/parse error, returns None.
pub fn load_quiz_config(path: &Path) -> Option<QuizConfig> {
  let shown = path.display();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(path = %shown, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(path = %shown, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(path = %shown, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::io::Write;

  fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(|k| map.get(k).cloned())
  }

  #[test]
  fn api_key_is_required() {
    assert!(matches!(settings(&[]), Err(ConfigError::MissingApiKey)));
    assert!(matches!(settings(&[("GOOGLE_API_KEY", "  ")]), Err(ConfigError::MissingApiKey)));
  }

  #[test]
  fn defaults_apply_without_overrides() {
    let s = settings(&[("GOOGLE_API_KEY", "k")]).expect("settings");
    assert_eq!(s.gemini.base_url, DEFAULT_BASE_URL);
    assert_eq!(s.gemini.model, DEFAULT_MODEL);
    assert_eq!(s.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
    assert_eq!(s.question_count, DEFAULT_QUESTION_COUNT);
    assert_eq!(s.id_base, DEFAULT_ID_BASE);
    assert!(s.mongo.is_none());
  }

  #[test]
  fn mongo_settings_follow_uri() {
    let s = settings(&[
      ("GOOGLE_API_KEY", "k"),
      ("MONGODB_URI", "mongodb://localhost:27017"),
      ("MONGODB_COLLECTION", "history"),
    ])
    .expect("settings");
    let mongo = s.mongo.expect("mongo");
    assert_eq!(mongo.database, DEFAULT_DB);
    assert_eq!(mongo.collection, "history");
  }

  #[test]
  fn bad_numbers_fall_back_to_defaults() {
    let s = settings(&[
      ("GOOGLE_API_KEY", "k"),
      ("QUIZ_QUESTION_COUNT", "lots"),
      ("QUIZ_ID_BASE", " 500 "),
    ])
    .expect("settings");
    assert_eq!(s.question_count, DEFAULT_QUESTION_COUNT);
    assert_eq!(s.id_base, 500);
  }

  #[test]
  fn prompts_load_from_toml_with_partial_override() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[prompts]\nquiz_user_template = \"{{count}} on {{topic}}\"").expect("write");
    let path = file.path().to_string_lossy().to_string();

    let s = settings(&[("GOOGLE_API_KEY", "k"), ("QUIZ_CONFIG_PATH", path.as_str())]).expect("settings");
    assert_eq!(s.prompts.quiz_user_template, "{count} on {topic}");
    assert_eq!(s.prompts.quiz_system, Prompts::default().quiz_system);
  }

  #[test]
  fn unreadable_config_uses_defaults() {
    assert!(load_quiz_config(Path::new("/nonexistent/quiz.toml")).is_none());
    let s = settings(&[("GOOGLE_API_KEY", "k"), ("QUIZ_CONFIG_PATH", "/nonexistent/quiz.toml")]).expect("settings");
    assert_eq!(s.prompts.quiz_user_template, Prompts::default().quiz_user_template);
  }
}
