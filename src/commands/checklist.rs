use std::path::Path;

use anyhow::Result;

use super::Context;

pub async fn run(
    config_path: Option<&Path>,
    id: &str,
    add: Option<String>,
    toggle: Option<usize>,
) -> Result<()> {
    let mut ctx = Context::load(config_path).await?;
    let id = ctx.resolve_id(id)?;

    if let Some(text) = add {
        if text.trim().is_empty() {
            anyhow::bail!("Checklist items can't be empty");
        }
        ctx.store.add_checklist_item(&id, text.trim());
    }

    if let Some(number) = toggle {
        let len = ctx
            .store
            .get_record(&id)
            .map(|r| r.checklist.len())
            .unwrap_or(0);
        if number == 0 || number > len {
            anyhow::bail!("No checklist item {} (the list has {} items)", number, len);
        }
        ctx.store.toggle_checklist_item(&id, number - 1);
    }

    ctx.finish().await;

    let Some(record) = ctx.store.get_record(&id) else {
        anyhow::bail!("No celebration with id '{}'", id);
    };

    println!("{}", record.display_name());
    if record.checklist.is_empty() {
        println!("  (empty checklist)");
    }
    for (i, item) in record.checklist.iter().enumerate() {
        let mark = if item.done { "x" } else { " " };
        println!("  {}. [{}] {}", i + 1, mark, item.text);
    }

    Ok(())
}
