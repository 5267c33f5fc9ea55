use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDateTime};
use notify_rust::Notification;

use crate::event::config::CelebrateConfig;
use crate::event::date::start_of_day;
use crate::event::notifier::{DeliveryState, FileNotifier, Notifier, PendingReminder, due_reminders};

/// Show desktop notifications for reminders that came due since the last check.
///
/// The first check ever only looks back to the start of today.
pub async fn run(config_path: Option<&Path>, watch: bool, interval: u64) -> Result<()> {
    let config = CelebrateConfig::load(config_path)?;
    let data_dir = config.data_path();

    if !watch {
        let delivered = check_once(&config, &data_dir, Local::now().naive_local()).await?;
        if delivered == 0 {
            println!("No reminders due.");
        }
        return Ok(());
    }

    loop {
        watch_tick(&config, &data_dir, Local::now().naive_local()).await;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval.max(1))) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// One check of the watch loop. A failure is logged and retried on the next tick.
async fn watch_tick(config: &CelebrateConfig, data_dir: &Path, now: NaiveDateTime) -> bool {
    match check_once(config, data_dir, now).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "reminder check failed");
            false
        }
    }
}

async fn check_once(config: &CelebrateConfig, data_dir: &Path, now: NaiveDateTime) -> Result<usize> {
    let mut notifier = FileNotifier::in_dir(data_dir);
    notifier
        .initialize()
        .await
        .context("Failed to read pending reminders")?;

    let mut state = DeliveryState::load(data_dir)
        .await
        .context("Failed to read reminder state")?;
    let since = state.last_checked.unwrap_or_else(|| start_of_day(now));

    let due = due_reminders(notifier.pending(), since, now, config.leap_day);
    for reminder in &due {
        show(reminder);
    }

    state.last_checked = Some(now);
    state
        .save(data_dir)
        .await
        .context("Failed to save reminder state")?;

    Ok(due.len())
}

fn show(reminder: &PendingReminder) {
    println!("{}: {}", reminder.content.title, reminder.content.body);

    if let Err(e) = Notification::new()
        .appname("celebrate")
        .summary(&reminder.content.title)
        .body(&reminder.content.body)
        .show()
    {
        tracing::warn!(id = %reminder.id, "desktop notification failed: {e}");
    }
}
