use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::event::{CelebrationKind, CelebrationPatch, ReminderTime};

use super::{Context, validate_date, validate_kind};

#[derive(Args)]
pub struct EditArgs {
    /// Celebration id (or a unique prefix)
    pub id: String,

    #[arg(long)]
    pub first_name: Option<String>,

    /// Last name ("" clears it)
    #[arg(short, long)]
    pub last_name: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// birthday, nameday, other, or a custom type id
    #[arg(short = 't', long = "type")]
    pub kind: Option<CelebrationKind>,

    /// Note ("" clears it)
    #[arg(long)]
    pub note: Option<String>,

    /// Phone number ("" clears it)
    #[arg(long)]
    pub phone: Option<String>,

    /// Days before the occasion to remind
    #[arg(long)]
    pub lead: Option<u32>,

    /// Time of day to remind, HH:MM
    #[arg(long)]
    pub time: Option<ReminderTime>,

    /// Turn reminders on or off
    #[arg(long)]
    pub reminder: Option<bool>,
}

/// Empty strings clear optional fields.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

pub async fn run(config_path: Option<&Path>, args: EditArgs) -> Result<()> {
    let mut ctx = Context::load(config_path).await?;
    let id = ctx.resolve_id(&args.id)?;

    if let Some(date) = &args.date {
        validate_date(date)?;
    }
    if let Some(kind) = &args.kind {
        validate_kind(kind, &ctx.types)?;
    }

    let patch = CelebrationPatch {
        first_name: args.first_name,
        last_name: clearable(args.last_name),
        date: args.date,
        kind: args.kind,
        reminder_enabled: args.reminder,
        reminder_lead_time: args.lead,
        reminder_time: args.time,
        note: clearable(args.note),
        phone: clearable(args.phone),
        ..Default::default()
    };

    if patch.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one field to update.");
    }

    match ctx.store.update_record(&id, patch) {
        Some(record) => {
            ctx.finish().await;
            println!("Updated {} ({})", record.display_name(), record.id);
        }
        None => anyhow::bail!("No celebration with id '{}'", id),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearable() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some(String::new())), Some(None));
        assert_eq!(clearable(Some("x".into())), Some(Some("x".to_string())));
    }
}
