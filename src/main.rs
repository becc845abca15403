//! quizgen · Gemini quiz generator
//!
//! - Prompts for a topic on stdin
//! - Asks Gemini for a multiple-choice quiz and normalizes the reply
//! - Prints every question, then optionally stores them in MongoDB
//!
//! Important env variables (see `config` for the full list):
//!   GOOGLE_API_KEY  : required
//!   MONGODB_URI     : enables persistence if present
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod batch;
mod config;
mod display;
mod domain;
mod extract;
mod gemini;
mod normalize;
mod store;
mod telemetry;
mod util;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, instrument, warn};

use crate::batch::process_reply;
use crate::config::{MongoSettings, Settings};
use crate::domain::QuestionRecord;
use crate::gemini::Gemini;
use crate::store::QuizStore;

const TOPIC_PROMPT: &str = "Enter the topic for your quiz: ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  // A missing .env is fine; real env vars still apply.
  dotenv::dotenv().ok();
  telemetry::init_tracing();

  let settings = Settings::from_env()?;
  let gemini = Gemini::new(&settings.gemini)?;

  let topic = read_topic().await?;
  if topic.is_empty() {
    warn!("Empty topic; questions will fall back to the default category");
  }

  run(&settings, &gemini, &topic).await;
  Ok(())
}

/// Print the prompt and read one line from stdin.
async fn read_topic() -> std::io::Result<String> {
  print!("{}", TOPIC_PROMPT);
  std::io::stdout().flush()?;

  let mut line = String::new();
  BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// One quiz round. Every failure past bootstrap is reported here and ends the run normally.
#[instrument(level = "info", skip_all, fields(model = %gemini.model, count = settings.question_count))]
async fn run(settings: &Settings, gemini: &Gemini, topic: &str) {
  let raw = match gemini.generate_quiz(&settings.prompts, topic, settings.question_count).await {
    Ok(raw) => raw,
    Err(e) => {
      display::print_model_failure(&e);
      return;
    }
  };

  let records = match process_reply(&raw, topic, settings.id_base) {
    Ok(records) => records,
    Err(e) => {
      error!(error = %e, "Model reply could not be parsed");
      display::print_malformed(&e);
      return;
    }
  };

  display::print_quiz(&records);

  match &settings.mongo {
    Some(mongo) => persist(mongo, &records).await,
    None => display::print_skip_persistence(),
  }
}

async fn persist(mongo: &MongoSettings, records: &[QuestionRecord]) {
  if records.is_empty() {
    info!("No questions to store");
    return;
  }

  let store = match QuizStore::connect(mongo).await {
    Ok(store) => store,
    Err(e) => {
      error!(error = %e, "MongoDB client setup failed");
      display::print_insert_failure(&e);
      return;
    }
  };

  match store.insert_all(records).await {
    Ok(written) => display::print_inserted(written, store.namespace()),
    Err(e) => {
      error!(error = %e, "MongoDB insert failed");
      display::print_insert_failure(&e);
    }
  }
}
