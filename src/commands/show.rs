use std::path::Path;

use anyhow::Result;

use crate::event::date::{age_turning, days_until, format_long, next_occurrence, parse_calendar_date};
use crate::event::scheduler::plan_reminder;

use super::Context;

pub async fn run(config_path: Option<&Path>, id: &str, json: bool) -> Result<()> {
    let ctx = Context::load(config_path).await?;
    let id = ctx.resolve_id(id)?;
    let Some(record) = ctx.store.get_record(&id) else {
        anyhow::bail!("No celebration with id '{}'", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let now = ctx.store.now();
    let language = ctx.config.language;
    let leap = ctx.config.leap_day;

    println!("{}", record.display_name());
    println!("  Id:    {}", record.id);
    println!("  Type:  {}", record.kind.display_name(&ctx.types, language));
    println!("  Date:  {}", record.date);

    let next = parse_calendar_date(&record.date)
        .ok()
        .and_then(|d| next_occurrence(&d, now, leap));
    match next {
        Some(next) => {
            println!(
                "  Next:  {} ({})",
                format_long(next, language),
                language.relative_days(days_until(next, now))
            );
            if let Some(age) = age_turning(record, now, leap) {
                println!("  Turns: {}", age);
            }
        }
        None => println!("  Next:  (invalid date)"),
    }

    if record.reminder_enabled {
        match plan_reminder(record, now, leap) {
            Some(plan) => println!(
                "  Reminder: {} days before at {}, next on {}",
                record.reminder_lead_time,
                record.reminder_time,
                format_long(plan.trigger_date, language)
            ),
            None => println!("  Reminder: (cannot schedule)"),
        }
    } else {
        println!("  Reminder: off");
    }

    if let Some(phone) = &record.phone {
        println!("  Phone: {}", phone);
    }
    if let Some(note) = &record.note {
        println!("  Note:  {}", note);
    }

    if !record.checklist.is_empty() {
        println!("  Checklist:");
        for (i, item) in record.checklist.iter().enumerate() {
            let mark = if item.done { "x" } else { " " };
            println!("    {}. [{}] {}", i + 1, mark, item.text);
        }
    }

    Ok(())
}
