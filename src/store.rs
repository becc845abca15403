//! MongoDB persistence for generated quizzes.
//!
//! One `insert_many` per run. No retry and no rollback: a failed write is
//! reported and the run ends.

use mongodb::{Client, Collection};
use tracing::{info, instrument};

use crate::config::MongoSettings;
use crate::domain::QuestionRecord;

pub struct QuizStore {
  collection: Collection<QuestionRecord>,
  namespace: String,
}

impl QuizStore {
  /// Build a client for `settings.uri`. The driver connects lazily, so this
  /// only fails on a malformed URI or unresolvable SRV record.
  pub async fn connect(settings: &MongoSettings) -> Result<Self, String> {
    let client = Client::with_uri_str(&settings.uri).await.map_err(|e| e.to_string())?;
    let collection = client.database(&settings.database).collection(&settings.collection);
    Ok(Self {
      collection,
      namespace: format!("{}.{}", settings.database, settings.collection),
    })
  }

  /// `database.collection` the store writes to.
  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  /// Insert all records; returns how many the server acknowledged.
  #[instrument(level = "info", skip(self, records), fields(namespace = %self.namespace, count = records.len()))]
  pub async fn insert_all(&self, records: &[QuestionRecord]) -> Result<usize, String> {
    if records.is_empty() {
      return Ok(0);
    }
    let result = self.collection.insert_many(records, None).await.map_err(|e| e.to_string())?;
    let written = result.inserted_ids.len();
    info!(written, "Inserted quiz documents");
    Ok(written)
  }
}
