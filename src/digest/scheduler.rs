//! Report triggers: a single-worker queue fed by a daily ticker and by
//! the manual command.
//!
//! The queue holds at most one waiting request, so at most one report runs
//! and one more waits; anything beyond that is dropped.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, Timelike};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::report::{DailyReporter, ReportOutcome};
use crate::error::{ChannelError, ConfigError, Result, TriggerError};

/// Who asked for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Scheduled,
    Manual,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Scheduled => write!(f, "scheduled"),
            TriggerSource::Manual => write!(f, "manual"),
        }
    }
}

type ReportReply = oneshot::Sender<std::result::Result<ReportOutcome, ChannelError>>;

struct ReportRequest {
    source: TriggerSource,
    reply: Option<ReportReply>,
}

/// Handle for enqueueing report runs.
#[derive(Clone)]
pub struct ReportTrigger {
    tx: mpsc::Sender<ReportRequest>,
}

impl ReportTrigger {
    /// Enqueue a report without waiting for it.
    pub fn fire(&self, source: TriggerSource) -> std::result::Result<(), TriggerError> {
        self.enqueue(ReportRequest {
            source,
            reply: None,
        })
    }

    /// Enqueue a report and wait for its outcome.
    pub async fn run(&self, source: TriggerSource) -> Result<ReportOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.enqueue(ReportRequest {
            source,
            reply: Some(reply_tx),
        })?;
        let outcome = reply_rx.await.map_err(|_| TriggerError::WorkerStopped)??;
        Ok(outcome)
    }

    fn enqueue(&self, request: ReportRequest) -> std::result::Result<(), TriggerError> {
        let source = request.source;
        self.tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!(%source, "Report already queued; dropping trigger");
                TriggerError::Busy
            }
            mpsc::error::TrySendError::Closed(_) => TriggerError::WorkerStopped,
        })
    }
}

/// Spawn the worker that runs queued reports one at a time.
pub fn spawn_report_worker(reporter: Arc<DailyReporter>) -> (ReportTrigger, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ReportRequest>(1);

    let handle = tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let run_id = Uuid::new_v4();
            let span = tracing::info_span!("report", %run_id, source = %request.source);

            let result = reporter.run_report().instrument(span.clone()).await;
            span.in_scope(|| match &result {
                Ok(outcome) => tracing::info!(%outcome, "Report run finished"),
                Err(e) => tracing::error!(error = %e, "Report run failed; will retry on next trigger"),
            });

            if let Some(reply) = request.reply {
                let _ = reply.send(result);
            }
        }
        tracing::debug!("Report queue closed; worker exiting");
    });

    (ReportTrigger { tx }, handle)
}

/// Once-a-day wall-clock schedule in local time.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    time: NaiveTime,
    schedule: cron::Schedule,
}

impl DailySchedule {
    pub fn at(time: NaiveTime) -> std::result::Result<Self, ConfigError> {
        let expression = format!("0 {} {} * * *", time.minute(), time.hour());
        let schedule =
            cron::Schedule::from_str(&expression).map_err(|e| ConfigError::InvalidValue {
                key: "DIGEST_REPORT_TIME".to_string(),
                message: format!("invalid schedule '{expression}': {e}"),
            })?;
        Ok(Self { time, schedule })
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Next fire time strictly after `now`.
    pub fn next_after(&self, now: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(now).next()
    }
}

/// Spawn the daily ticker that fires a scheduled report at each occurrence.
///
/// Each fire time is derived from the previous one, so a wall clock stepped
/// backwards cannot fire the same occurrence twice.
pub fn spawn_daily_ticker(trigger: ReportTrigger, schedule: DailySchedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut next = schedule.next_after(&Local::now());
        while let Some(at) = next {
            let wait = (at - Local::now()).to_std().unwrap_or(Duration::ZERO);
            tracing::info!(next = %at.format("%Y-%m-%d %H:%M"), "Next daily report scheduled");
            tokio::time::sleep(wait).await;

            match trigger.fire(TriggerSource::Scheduled) {
                Ok(()) => {}
                Err(TriggerError::Busy) => {}
                Err(TriggerError::WorkerStopped) => {
                    tracing::error!("Report worker stopped; ticker stopping");
                    return;
                }
            }
            next = schedule.next_after(&at);
        }
        tracing::error!("Daily schedule has no upcoming fire time; ticker stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn schedule_fires_later_same_day() {
        let schedule = DailySchedule::at(NaiveTime::from_hms_opt(20, 0, 0).unwrap()).unwrap();
        let now = Local.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap();
        let next = schedule.next_after(&now).unwrap();
        assert_eq!(next.date_naive(), now.date_naive());
        assert_eq!((next.hour(), next.minute(), next.second()), (20, 0, 0));
    }

    #[test]
    fn schedule_rolls_to_next_day() {
        let schedule = DailySchedule::at(NaiveTime::from_hms_opt(20, 0, 0).unwrap()).unwrap();
        let now = Local.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        let next = schedule.next_after(&now).unwrap();
        assert_eq!(next.date_naive(), now.date_naive().succ_opt().unwrap());
        assert_eq!((next.hour(), next.minute()), (20, 0));
    }

    #[test]
    fn schedule_keeps_minutes() {
        let schedule = DailySchedule::at(NaiveTime::from_hms_opt(7, 45, 0).unwrap()).unwrap();
        assert_eq!(schedule.time(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        let now = Local.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();
        let next = schedule.next_after(&now).unwrap();
        assert_eq!((next.hour(), next.minute()), (7, 45));
    }

    #[test]
    fn trigger_source_display() {
        assert_eq!(TriggerSource::Scheduled.to_string(), "scheduled");
        assert_eq!(TriggerSource::Manual.to_string(), "manual");
    }

    #[tokio::test]
    async fn closed_queue_reports_worker_stopped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let trigger = ReportTrigger { tx };
        assert!(matches!(
            trigger.fire(TriggerSource::Manual),
            Err(TriggerError::WorkerStopped)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_fires_once_per_occurrence() {
        let (tx, mut rx) = mpsc::channel(1);
        let trigger = ReportTrigger { tx };
        let target = (Local::now() + chrono::Duration::minutes(90)).time();
        let schedule = DailySchedule::at(target).unwrap();

        let ticker = spawn_daily_ticker(trigger, schedule);

        let request = tokio::time::timeout(Duration::from_secs(2 * 3600), rx.recv())
            .await
            .expect("ticker did not fire")
            .expect("ticker dropped the queue");
        assert_eq!(request.source, TriggerSource::Scheduled);
        assert!(request.reply.is_none());

        // The following occurrence is a day away.
        assert!(
            tokio::time::timeout(Duration::from_secs(3600), rx.recv())
                .await
                .is_err()
        );
        ticker.abort();
    }

    #[tokio::test]
    async fn full_queue_reports_busy() {
        let (tx, _rx) = mpsc::channel(1);
        let trigger = ReportTrigger { tx };
        trigger.fire(TriggerSource::Scheduled).unwrap();
        assert!(matches!(
            trigger.fire(TriggerSource::Manual),
            Err(TriggerError::Busy)
        ));
    }
}
