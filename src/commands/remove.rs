use std::path::Path;

use anyhow::Result;

use super::Context;

pub async fn run(config_path: Option<&Path>, id: &str) -> Result<()> {
    let mut ctx = Context::load(config_path).await?;
    let id = ctx.resolve_id(id)?;

    if let Some(record) = ctx.store.remove_record(&id) {
        println!("Removed {} ({})", record.display_name(), record.id);
    }
    ctx.finish().await;

    Ok(())
}
