//! event-scout entry point.
//!
//! Runs one scan and delivers the digest, then exits. Meant to be started
//! periodically by an external scheduler.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use event_scout::config::ScoutConfig;
use event_scout::error::ScoutError;
use event_scout::fetcher::HttpEventFetcher;
use event_scout::logging;
use event_scout::notify::{Digest, LogNotifier, Notifier, WebhookNotifier};
use event_scout::persistence::{SqliteStatusStore, StatusStore};
use event_scout::service::ScoutService;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ScoutConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("event-scout: {e}");
            return e.exit_code();
        }
    };

    // Flushes the log file on drop.
    let _log_guard = match logging::init(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("event-scout: {e}");
            return e.exit_code();
        }
    };

    let notifier = match build_notifier(&config) {
        Ok(notifier) => notifier,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "invalid notifier configuration");
            return e.exit_code();
        }
    };

    match run(&config, notifier.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "run aborted");
            deliver(notifier.as_ref(), &Digest::for_failure(&e)).await;
            e.exit_code()
        }
    }
}

async fn run(config: &ScoutConfig, notifier: &dyn Notifier) -> Result<(), ScoutError> {
    config.validate()?;
    tracing::info!(
        database = %config.database_path.display(),
        base_url = %config.base_url,
        floor = config.initial_event_id,
        max_not_found = config.max_not_found,
        "starting event-scout"
    );

    let fetcher = Arc::new(HttpEventFetcher::new(
        &config.fetcher_config(),
        config.links(),
        config.criteria(),
    )?);
    let store: Arc<dyn StatusStore> =
        Arc::new(SqliteStatusStore::open(&config.database_path).await?);

    let service = ScoutService::new(
        Arc::clone(&store),
        fetcher,
        config.links(),
        config.scan_settings(),
        config.max_reverify,
    );
    let result = service.run().await;

    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "closing the status store failed");
    }

    let report = result?;
    tracing::info!(
        run_id = %report.run_id,
        events = report.events.len(),
        "{}",
        report.message()
    );

    match Digest::for_run(&report) {
        Some(digest) => deliver(notifier, &digest).await,
        None => tracing::info!("no new event to send"),
    }
    Ok(())
}

fn build_notifier(config: &ScoutConfig) -> Result<Box<dyn Notifier>, ScoutError> {
    match &config.webhook_url {
        Some(url) => Ok(Box::new(WebhookNotifier::new(
            url,
            Duration::from_secs(config.fetch_timeout_secs),
        )?)),
        None => Ok(Box::new(LogNotifier)),
    }
}

async fn deliver(notifier: &dyn Notifier, digest: &Digest) {
    if let Err(e) = notifier.send(digest).await {
        tracing::error!(error = %e, subject = %digest.subject, "digest delivery failed");
    }
}
