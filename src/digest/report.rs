//! Daily report: snapshot → summarize → dispatch → reset.
//!
//! A report is either delivered and its entries cleared, or not delivered
//! and the state left untouched for the next trigger to retry.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::state::{DigestSnapshot, DigestState};
use super::summarizer::{SUMMARY_FALLBACK, Summarizer};
use crate::channels::Channel;
use crate::error::ChannelError;

/// Sent instead of a report when nothing was collected.
pub const NO_MESSAGES_NOTICE: &str = "📢 No new messages today.";

/// Number of keywords listed in the report.
pub const TOP_KEYWORDS: usize = 3;

/// Upper bound on a report, in bytes. Matches Telegram's per-message limit,
/// so a report always goes out as one message.
pub const REPORT_MAX_LEN: usize = 4096;

/// Upper bound on the summary section, in bytes.
const SUMMARY_MAX_LEN: usize = 1024;

/// What a successful `run_report` sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The no-messages notice.
    Empty,
    /// A full report covering this many posts.
    Delivered { messages: usize },
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportOutcome::Empty => write!(f, "no messages today, notice sent"),
            ReportOutcome::Delivered { messages } => {
                write!(f, "daily digest sent ({messages} messages)")
            }
        }
    }
}

/// Builds and dispatches the daily report.
pub struct DailyReporter {
    state: Arc<DigestState>,
    summarizer: Summarizer,
    channel: Arc<dyn Channel>,
    report_chat_id: String,
    run_lock: Mutex<()>,
}

impl DailyReporter {
    pub fn new(
        state: Arc<DigestState>,
        summarizer: Summarizer,
        channel: Arc<dyn Channel>,
        report_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            state,
            summarizer,
            channel,
            report_chat_id: report_chat_id.into(),
            run_lock: Mutex::new(()),
        }
    }

    /// Compose and send today's report.
    ///
    /// Summarizer failures degrade the report; dispatch failures are
    /// returned and leave the collected posts in place.
    pub async fn run_report(&self) -> Result<ReportOutcome, ChannelError> {
        let _running = self.run_lock.lock().await;

        let snapshot = self.state.snapshot().await;
        if snapshot.is_empty() {
            self.channel
                .send(&self.report_chat_id, NO_MESSAGES_NOTICE)
                .await?;
            tracing::info!("No messages collected today; notice sent");
            return Ok(ReportOutcome::Empty);
        }

        let summary = match self.summarizer.summarize(&snapshot.raw.join("\n")).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "Summary generation failed; using fallback");
                SUMMARY_FALLBACK.to_string()
            }
        };

        let today = chrono::Local::now().date_naive();
        let report = compose_report(today, &snapshot, &summary);

        if let Err(e) = self.channel.send(&self.report_chat_id, &report).await {
            tracing::error!(
                error = %e,
                pending = snapshot.len(),
                "Report dispatch failed; keeping collected messages for retry"
            );
            return Err(e);
        }

        self.state.clear_reported(&snapshot).await;
        tracing::info!(messages = snapshot.len(), "Daily digest sent");
        Ok(ReportOutcome::Delivered {
            messages: snapshot.len(),
        })
    }
}

/// Numbered display lines, one per line, within `budget` bytes.
///
/// Lines that do not fit are dropped from the tail and replaced by an
/// `… and N more` line.
pub fn render_digest(lines: &[String], budget: usize) -> String {
    let mut digest = String::new();
    for (i, line) in lines.iter().enumerate() {
        let separator = if i == 0 { "" } else { "\n" };
        let entry = format!("{separator}{}. {line}", i + 1);
        let remaining = lines.len() - i - 1;
        let reserve = if remaining == 0 {
            0
        } else {
            overflow_line(remaining).len() + 1
        };

        if digest.len() + entry.len() + reserve > budget {
            digest.push_str(separator);
            digest.push_str(&overflow_line(lines.len() - i));
            return digest;
        }
        digest.push_str(&entry);
    }
    digest
}

fn overflow_line(omitted: usize) -> String {
    format!("… and {omitted} more")
}

/// Cut `text` to at most `max` bytes on a char boundary, marking the cut.
fn clip(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max.saturating_sub('…'.len_utf8());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

/// `{word} mentioned {count} times` for the top keywords, or `none`.
pub fn render_keywords(snapshot: &DigestSnapshot) -> String {
    let top = snapshot.tally.top(TOP_KEYWORDS);
    if top.is_empty() {
        return "none".to_string();
    }
    top.iter()
        .map(|(word, count)| format!("{word} mentioned {count} times"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full report text for `date`, never longer than [`REPORT_MAX_LEN`].
pub fn compose_report(date: NaiveDate, snapshot: &DigestSnapshot, summary: &str) -> String {
    let header = format!("📢 {} Daily digest\n\n", date.format("%Y-%m-%d"));
    let footer = format!(
        "\n\n▬▬\n\n\
         • {total} messages in total, top keywords: {keywords}\n\n\
         📌 AI summary: {summary}",
        total = snapshot.len(),
        keywords = render_keywords(snapshot),
        summary = clip(summary, SUMMARY_MAX_LEN),
    );
    let budget = REPORT_MAX_LEN.saturating_sub(header.len() + footer.len());
    format!("{header}{}{footer}", render_digest(&snapshot.lines, budget))
}
