use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use post_digest::bot::DigestBot;
use post_digest::channels::{Channel, CliChannel, TelegramChannel};
use post_digest::config::BotConfig;
use post_digest::digest::{
    DailyReporter, DailySchedule, DigestState, Summarizer, SummarizerConfig, spawn_daily_ticker,
    spawn_report_worker,
};
use post_digest::llm::{LlmConfig, create_provider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing();

    let config = BotConfig::from_env().context("invalid bot configuration")?;
    let llm_config = LlmConfig::from_env().context("invalid LLM configuration")?;
    let schedule = DailySchedule::at(config.report_time)?;

    eprintln!("📡 post-digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   Group: {}", config.group_id);
    eprintln!("   Report chat: {}", config.report_chat_id);
    eprintln!("   Keywords: {}", config.keywords.join(", "));
    eprintln!(
        "   Daily report: {} (manual: /{})",
        schedule.time().format("%H:%M"),
        config.manual_command
    );

    let llm = create_provider(&llm_config)?;

    // ── Channel ─────────────────────────────────────────────────────────
    let channel: Arc<dyn Channel> = match &config.telegram_token {
        Some(token) => {
            eprintln!(
                "   Channel: telegram (allowed: {})",
                if config.allowed_users.iter().any(|u| u == "*") {
                    "everyone".to_string()
                } else {
                    config.allowed_users.join(", ")
                }
            );
            let telegram = TelegramChannel::new(token.clone(), config.allowed_users.clone());
            telegram
                .health_check()
                .await
                .context("Telegram bot token rejected")?;
            Arc::new(telegram)
        }
        None => {
            eprintln!("   Channel: cli (stdin lines are posted to the group)\n");
            Arc::new(CliChannel::new(config.group_id.clone()))
        }
    };

    // ── Digest pipeline ─────────────────────────────────────────────────
    let state = Arc::new(DigestState::new(&config.keywords));
    let summarizer = Summarizer::new(
        llm,
        SummarizerConfig {
            timeout: llm_config.timeout,
            ..SummarizerConfig::default()
        },
    );
    let reporter = Arc::new(DailyReporter::new(
        Arc::clone(&state),
        summarizer,
        Arc::clone(&channel),
        config.report_chat_id.clone(),
    ));

    let (trigger, _worker_handle) = spawn_report_worker(reporter);
    let _ticker_handle = spawn_daily_ticker(trigger.clone(), schedule);

    let bot = DigestBot::new(
        channel,
        state,
        trigger,
        config.group_id,
        config.manual_command,
    );
    tracing::info!("Bot listening for group messages");
    bot.run().await?;

    Ok(())
}

/// Stderr logging filtered by `RUST_LOG` (default `info`), plus a daily
/// rolling file when `DIGEST_LOG_DIR` is set.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard) = match std::env::var("DIGEST_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "post-digest.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
