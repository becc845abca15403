//! Terminal output: question blocks, status lines and failure reports.

use owo_colors::OwoColorize;

use crate::batch::MalformedReplyError;
use crate::domain::QuestionRecord;

const RULE_WIDTH: usize = 60;

/// One question block. `number` is the 1-based position in the quiz.
pub fn render_question(number: usize, rec: &QuestionRecord) -> String {
  let rule = "=".repeat(RULE_WIDTH);
  let mut lines = Vec::with_capacity(rec.options.len() + 5);

  lines.push(rule.blue().to_string());
  lines.push(format!("Q{} ({}): {}", number, rec.id, rec.question_text).cyan().bold().to_string());
  for (i, opt) in rec.options.iter().enumerate() {
    let mark = if i == rec.correct_index { '*' } else { ' ' };
    lines.push(format!(" {} {}. {}", mark, i + 1, opt).yellow().to_string());
  }
  lines.push(format!("  Correct Answer: {}", rec.correct_option()).green().bold().to_string());
  lines.push(format!("  Backstory: {}", rec.backstory).magenta().to_string());
  lines.push(rule.blue().to_string());

  lines.join("\n")
}

pub fn print_quiz(records: &[QuestionRecord]) {
  for (i, rec) in records.iter().enumerate() {
    println!();
    println!("{}", render_question(i + 1, rec));
  }
}

pub fn render_malformed(err: &MalformedReplyError) -> String {
  [
    "Failed to parse or display quiz:".red().bold().to_string(),
    err.to_string(),
    "Raw response:".red().to_string(),
    err.text().to_string(),
  ]
  .join("\n")
}

pub fn print_malformed(err: &MalformedReplyError) {
  println!("{}", render_malformed(err));
}

pub fn print_model_failure(message: &str) {
  println!("{} {}", "Quiz generation failed:".red().bold(), message);
}

pub fn print_inserted(count: usize, namespace: &str) {
  println!("{}", format!("Inserted {} documents into {}", count, namespace).green());
}

pub fn print_insert_failure(message: &str) {
  println!("{}", format!("MongoDB insert failed: {}", message).red());
}

pub fn print_skip_persistence() {
  println!("{}", "MONGODB_URI not set; skipping DB insert.".yellow());
}
