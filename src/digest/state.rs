//! The accumulation period shared between message intake and the reporter.

use tokio::sync::Mutex;

use super::extractor::ForwardedPost;
use super::tally::KeywordTally;

/// Everything collected since the last successful report.
#[derive(Debug, Clone)]
pub struct DigestSnapshot {
    /// Display lines in arrival order.
    pub lines: Vec<String>,
    /// Raw descriptions, parallel to `lines`.
    pub raw: Vec<String>,
    pub tally: KeywordTally,
}

impl DigestSnapshot {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Pending digest, raw content log and keyword tally behind one lock.
///
/// Only the reporter removes entries, and it removes exactly what it
/// snapshotted, so posts recorded while a report is being composed carry
/// over to the next period.
pub struct DigestState {
    period: Mutex<DigestSnapshot>,
}

impl DigestState {
    pub fn new(vocabulary: &[String]) -> Self {
        Self {
            period: Mutex::new(DigestSnapshot {
                lines: Vec::new(),
                raw: Vec::new(),
                tally: KeywordTally::new(vocabulary.iter().cloned()),
            }),
        }
    }

    /// Append a post and count its keywords. Returns the new pending count.
    pub async fn record(&self, post: ForwardedPost) -> usize {
        let mut period = self.period.lock().await;
        period.tally.update(&post.raw_content);
        period.lines.push(post.display_line);
        period.raw.push(post.raw_content);
        period.lines.len()
    }

    /// Copy of the current period.
    pub async fn snapshot(&self) -> DigestSnapshot {
        self.period.lock().await.clone()
    }

    /// Drop the entries covered by `snapshot` after it has been reported.
    pub async fn clear_reported(&self, snapshot: &DigestSnapshot) {
        let mut period = self.period.lock().await;
        let n = snapshot.len().min(period.lines.len());
        period.lines.drain(..n);
        period.raw.drain(..n);
        period.tally.subtract(&snapshot.tally);
        debug_assert_eq!(period.lines.len(), period.raw.len());
    }

    pub async fn len(&self) -> usize {
        self.period.lock().await.lines.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
