use std::path::Path;

use anyhow::Result;

use crate::event::scheduler::ScheduleOutcome;

use super::Context;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let mut ctx = Context::load(config_path).await?;

    if !ctx.scheduler.is_initialized() {
        anyhow::bail!("Reminders are unavailable, nothing was rescheduled");
    }

    let outcomes = ctx
        .scheduler
        .reschedule_all(ctx.store.records(), ctx.store.now(), &ctx.types)
        .await?;

    let mut scheduled = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for (id, outcome) in outcomes {
        match outcome {
            Ok(ScheduleOutcome::Scheduled(_)) => scheduled += 1,
            Ok(ScheduleOutcome::Disabled) => skipped += 1,
            Ok(ScheduleOutcome::InvalidDate) => {
                skipped += 1;
                eprintln!("Warning: {} has an unusable date or lead time, no reminder", id);
            }
            Ok(ScheduleOutcome::NotInitialized) => failed += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Warning: could not schedule {}: {}", id, e);
            }
        }
    }

    println!(
        "Rescheduled {} reminders ({} skipped, {} failed)",
        scheduled, skipped, failed
    );

    Ok(())
}
