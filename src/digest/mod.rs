//! Daily digest pipeline: extract → accumulate → summarize → report → reset.

pub mod extractor;
pub mod report;
pub mod scheduler;
pub mod state;
pub mod summarizer;
pub mod tally;

pub use extractor::{ForwardedPost, extract};
pub use report::{DailyReporter, ReportOutcome};
pub use scheduler::{
    DailySchedule, ReportTrigger, TriggerSource, spawn_daily_ticker, spawn_report_worker,
};
pub use state::{DigestSnapshot, DigestState};
pub use summarizer::{Summarizer, SummarizerConfig};
pub use tally::KeywordTally;
