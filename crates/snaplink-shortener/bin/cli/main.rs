mod cli;
mod render;

use crate::cli::{Command, LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use snaplink_core::{LinkRef, Shortcode, SystemClock};
use snaplink_generator::RandomGenerator;
use snaplink_shortener::notifier::{self, NotifierHandle};
use snaplink_shortener::{LinkRegistry, SubmissionProcessor, TracingSink};
use snaplink_storage::JsonFileStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Registry = LinkRegistry<JsonFileStore, SystemClock>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        store = %config.store.display(),
        base_url = %config.base_url,
        "starting snaplink"
    );

    let (handle, notifier_task) = notifier::spawn(TracingSink, config.logger_token.clone());
    let registry = LinkRegistry::load(
        JsonFileStore::new(&config.store),
        SystemClock,
        handle.clone(),
    )
    .await
    .with_context(|| format!("failed to load {}", config.store.display()))?;

    let result = run(config.command, &config.base_url, Arc::new(registry), handle).await;

    // every handle is gone once `run` returns; wait for queued notifications
    flush_notifications(notifier_task).await;
    result
}

/// Waits for the notifier task to drain. Returns `false` if it did not
/// finish cleanly.
async fn flush_notifications(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "notifier task did not finish cleanly");
            false
        }
    }
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn run(
    command: Command,
    base_url: &str,
    registry: Arc<Registry>,
    notifier: NotifierHandle,
) -> anyhow::Result<()> {
    match command {
        Command::Submit { rows } => {
            let processor = SubmissionProcessor::new(registry, RandomGenerator::new(), notifier);
            let receipt = processor.submit_batch(rows).await?;
            println!("{}", receipt.message());
            for record in receipt.records() {
                println!(
                    "{} -> {}",
                    record.shortcode().to_url(base_url),
                    record.long_url()
                );
            }
        }
        Command::List { all } => {
            let now = registry.now();
            let rows: Vec<_> = registry
                .records()
                .await
                .into_iter()
                .enumerate()
                .filter(|(_, record)| all || !record.is_expired(now))
                .collect();
            print!("{}", render::link_table(&rows, base_url, now));
        }
        Command::Open { target, source, geo } => {
            let target = resolve_target(&registry, &target).await;
            registry.record_click(target.clone(), &source, &geo).await?;
            let record = registry
                .get(target)
                .await
                .context("link disappeared after recording click")?;
            println!("{}", record.long_url());
        }
        Command::Clicks { target } => {
            let target = resolve_target(&registry, &target).await;
            let record = registry
                .get(target.clone())
                .await
                .with_context(|| format!("link not found: {target}"))?;
            print!("{}", render::click_log(&record));
        }
    }
    Ok(())
}

/// Prefers an existing short code; falls back to a list position.
async fn resolve_target(registry: &Registry, raw: &str) -> LinkRef {
    if let Ok(code) = Shortcode::new(raw) {
        if registry.contains(&code).await {
            return LinkRef::Code(code);
        }
    }
    match raw.parse::<usize>() {
        Ok(index) => LinkRef::Index(index),
        Err(_) => LinkRef::Code(Shortcode::new_unchecked(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flush_reports_clean_exit() {
        let task = tokio::spawn(async {});
        assert!(flush_notifications(task).await);
    }

    #[tokio::test]
    async fn flush_reports_panicked_task() {
        let task = tokio::spawn(async { panic!("sink blew up") });
        assert!(!flush_notifications(task).await);
    }
}
