//! Minimal Gemini client for quiz generation.
//!
//! We only call `models/{model}:generateContent` and return the reply text.
//! Calls are instrumented and log model name, latency and response size (not contents).
//!
//! NOTE: the API key travels in the `x-goog-api-key` header, never in the URL, so it
//! cannot leak through request logging.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::{GeminiSettings, Prompts};
use crate::util::{fill_template, trunc_for_log};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  pub fn new(settings: &GeminiSettings) -> Result<Self, String> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .map_err(|e| e.to_string())?;

    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      model: settings.model.clone(),
    })
  }

  /// Single-turn text generation. Returns the concatenated text parts of the
  /// first candidate.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn generate_text(&self, system: &str, user: &str, temperature: f32) -> Result<String, String> {
    let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      system_instruction: (!system.is_empty()).then(|| Content {
        role: None,
        parts: vec![Part { text: Some(system.to_string()) }],
      }),
      contents: vec![Content {
        role: Some("user".into()),
        parts: vec![Part { text: Some(user.to_string()) }],
      }],
      generation_config: GenerationConfig { temperature },
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, concat!("quizgen/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidates_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text: String = body.candidates.first()
      .and_then(|c| c.content.as_ref())
      .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
      .unwrap_or_default();

    if text.trim().is_empty() {
      let reason = body.candidates.first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("unknown");
      return Err(format!("Gemini returned no text (finish reason: {})", reason));
    }

    Ok(text)
  }

  /// Ask the model for `count` questions about `topic`. Returns the raw reply.
  #[instrument(level = "info", skip(self, prompts, topic), fields(topic_len = topic.len(), model = %self.model))]
  pub async fn generate_quiz(&self, prompts: &Prompts, topic: &str, count: u32) -> Result<String, String> {
    let count = count.to_string();
    let user = fill_template(&prompts.quiz_user_template, &[("topic", topic), ("count", &count)]);

    let start = Instant::now();
    let result = self.generate_text(&prompts.quiz_system, &user, 0.7).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(text) => {
        info!(?elapsed, reply_len = text.len(), "Model response received successfully");
        debug!(preview = %trunc_for_log(text, 200), "Model reply preview");
      }
      Err(e) => error!(?elapsed, error = %e, "Model call failed during quiz generation"),
    }
    result
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  system_instruction: Option<Content>,
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig { temperature: f32 }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  #[serde(default)] content: Option<Content>,
  #[serde(default)] finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
