use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::event::date::{days_until, format_long, next_occurrence, parse_calendar_date};
use crate::event::{CelebrationInput, CelebrationKind, ReminderTime};

use super::{Context, validate_date, validate_kind};

#[derive(Args)]
pub struct AddArgs {
    /// First name (or the whole name)
    pub first_name: String,

    /// Date of the occasion (YYYY-MM-DD); the year is used for ages
    #[arg(short, long)]
    pub date: String,

    /// Last name
    #[arg(short, long)]
    pub last_name: Option<String>,

    /// birthday, nameday, other, or a custom type id
    #[arg(short = 't', long = "type", default_value = "birthday")]
    pub kind: CelebrationKind,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Days before the occasion to remind (defaults to config)
    #[arg(long)]
    pub lead: Option<u32>,

    /// Time of day to remind, HH:MM (defaults to config)
    #[arg(long)]
    pub time: Option<ReminderTime>,

    /// Don't schedule a reminder
    #[arg(long)]
    pub no_reminder: bool,
}

pub async fn run(config_path: Option<&Path>, args: AddArgs) -> Result<()> {
    let mut ctx = Context::load(config_path).await?;

    validate_date(&args.date)?;
    validate_kind(&args.kind, &ctx.types)?;

    let defaults = &ctx.config.reminders;
    let input = CelebrationInput {
        first_name: args.first_name,
        last_name: args.last_name,
        date: args.date,
        kind: args.kind,
        reminder_enabled: Some(!args.no_reminder),
        reminder_lead_time: Some(args.lead.unwrap_or(defaults.lead_days)),
        reminder_time: Some(args.time.unwrap_or(defaults.time)),
        note: args.note,
        phone: args.phone,
        ..Default::default()
    };

    let record = ctx.store.add_record(input);
    ctx.finish().await;

    let now = ctx.store.now();
    let language = ctx.config.language;
    println!("Added {} ({})", record.display_name(), record.id);

    let next = parse_calendar_date(&record.date)
        .ok()
        .and_then(|d| next_occurrence(&d, now, ctx.config.leap_day));
    if let Some(next) = next {
        println!(
            "  Next: {} ({})",
            format_long(next, language),
            language.relative_days(days_until(next, now))
        );
    }

    Ok(())
}
