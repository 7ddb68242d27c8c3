//! Message intake: routes group posts into the digest and the manual
//! command into the report queue.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, IncomingMessage};
use crate::digest::{DigestState, ReportTrigger, TriggerSource, extract};
use crate::error::{ChannelError, Error, TriggerError};

/// What intake did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intake {
    /// Forwarded post added; pending count after the append.
    Recorded(usize),
    /// Manual report requested.
    ReportRequested,
    /// Not from the group, or not a forwarded post.
    Ignored,
}

/// The bot's intake loop.
pub struct DigestBot {
    channel: Arc<dyn Channel>,
    state: Arc<DigestState>,
    trigger: ReportTrigger,
    group_id: String,
    manual_command: String,
}

impl DigestBot {
    pub fn new(
        channel: Arc<dyn Channel>,
        state: Arc<DigestState>,
        trigger: ReportTrigger,
        group_id: impl Into<String>,
        manual_command: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            state,
            trigger,
            group_id: group_id.into(),
            manual_command: manual_command.into(),
        }
    }

    /// Consume the channel's messages until the stream ends.
    pub async fn run(&self) -> Result<(), ChannelError> {
        let mut messages = self.channel.start().await?;
        tracing::info!(
            channel = self.channel.name(),
            group = %self.group_id,
            "Listening for forwarded posts"
        );

        while let Some(msg) = messages.next().await {
            self.handle_message(&msg).await;
        }

        tracing::info!(channel = self.channel.name(), "Message stream ended");
        self.channel.shutdown().await
    }

    /// Handle one inbound message. Never fails; problems are logged.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Intake {
        tracing::debug!(
            sender = msg.sender(),
            chat = %msg.chat_id,
            "Received message"
        );

        if is_command(&msg.content, &self.manual_command) {
            self.spawn_manual_report(msg.clone());
            return Intake::ReportRequested;
        }

        if msg.chat_id != self.group_id {
            return Intake::Ignored;
        }

        let Some(post) = extract(&msg.content) else {
            return Intake::Ignored;
        };

        let pending = self.state.record(post).await;
        tracing::info!(sender = msg.sender(), pending, "Forwarded post queued for digest");
        Intake::Recorded(pending)
    }

    /// Run a report through the queue and tell the requester how it went.
    /// Runs on its own task so intake keeps flowing while the report composes.
    fn spawn_manual_report(&self, msg: IncomingMessage) {
        let trigger = self.trigger.clone();
        let channel = Arc::clone(&self.channel);

        tokio::spawn(async move {
            tracing::info!(sender = msg.sender(), "Manual report requested");
            let reply = match trigger.run(TriggerSource::Manual).await {
                Ok(outcome) => format!("✅ Report done: {outcome}."),
                Err(Error::Channel(e)) => {
                    format!("❌ Report failed, messages kept for retry: {e}")
                }
                Err(Error::Trigger(TriggerError::Busy)) => {
                    "⏳ A report is already queued; try again shortly.".to_string()
                }
                Err(e) => format!("❌ Report unavailable: {e}"),
            };
            if let Err(e) = channel.respond(&msg, &reply).await {
                tracing::warn!(error = %e, "Failed to acknowledge manual report");
            }
        });
    }
}

/// True if `content` is `/command` or `/command@BotName`, optionally
/// followed by arguments.
fn is_command(content: &str, command: &str) -> bool {
    let Some(first) = content.split_whitespace().next() else {
        return false;
    };
    let Some(name) = first.strip_prefix('/') else {
        return false;
    };
    let name = name.split('@').next().unwrap_or(name);
    name == command
}
