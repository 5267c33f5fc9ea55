use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::ics::generate_ics;

use super::Context;

pub async fn run(config_path: Option<&Path>, output: Option<PathBuf>) -> Result<()> {
    let ctx = Context::load(config_path).await?;

    let ics = generate_ics(
        ctx.store.records(),
        ctx.store.now(),
        ctx.config.leap_day,
        ctx.config.language,
        &ctx.types,
    )?;

    match output {
        Some(path) => {
            std::fs::write(&path, ics)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} celebrations to {}",
                ctx.store.records().len(),
                path.display()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}
