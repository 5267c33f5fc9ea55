use std::path::Path;

use anyhow::Result;

use crate::event::date::format_long;

use super::Context;

pub async fn run(config_path: Option<&Path>, days: Option<i64>) -> Result<()> {
    let ctx = Context::load(config_path).await?;
    let language = ctx.config.language;

    let upcoming: Vec<_> = ctx
        .store
        .upcoming(ctx.config.leap_day)
        .into_iter()
        .filter(|u| days.is_none_or(|limit| u.days_until <= limit))
        .collect();

    if upcoming.is_empty() {
        match days {
            Some(limit) => println!("Nothing to celebrate in the next {} days.", limit),
            None => println!("No celebrations yet. Add one with `celebrate add`."),
        }
        return Ok(());
    }

    for u in upcoming {
        let kind = u.record.kind.display_name(&ctx.types, language);
        let age = u
            .age_turning
            .map(|age| format!(", turns {}", age))
            .unwrap_or_default();

        println!(
            "{:<12} {} ({}{}) {}",
            language.relative_days(u.days_until),
            u.record.display_name(),
            kind,
            age,
            format_long(u.occurrence, language)
        );
        println!("             {}", u.record.id);
    }

    Ok(())
}
