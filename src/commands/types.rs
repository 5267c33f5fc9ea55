use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Subcommand;

use crate::event::CelebrationKind;
use crate::event::custom_types::{CustomType, CustomTypeRegistry};

use super::Context;

#[derive(Subcommand)]
pub enum TypesCommand {
    /// List custom celebration types
    List,
    /// Add or rename a custom type
    Add {
        /// Identifier used with `--type`
        id: String,
        /// Display name
        name: String,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Remove a custom type
    Remove { id: String },
}

pub async fn run(config_path: Option<&Path>, command: TypesCommand) -> Result<()> {
    let ctx = Context::load(config_path).await?;
    let mut registry: CustomTypeRegistry = ctx.types;

    match command {
        TypesCommand::List => {
            if registry.types().is_empty() {
                println!("No custom types. Built-in: birthday, nameday, other");
            }
            for t in registry.types() {
                println!("{:<16} {}", t.id, t.label());
            }
            return Ok(());
        }
        TypesCommand::Add { id, name, emoji } => {
            let custom_type = CustomType {
                id: id.trim().to_string(),
                name,
                emoji,
            };
            let label = custom_type.label();
            registry.upsert(custom_type)?;
            println!("Saved type {} ({})", id.trim(), label);
        }
        TypesCommand::Remove { id } => {
            let removed = registry.remove(&id)?;
            println!("Removed type {}", removed.id);

            let kind = CelebrationKind::Custom(removed.id);
            let in_use = ctx.store.records().iter().filter(|r| r.kind == kind).count();
            if in_use > 0 {
                eprintln!(
                    "Warning: {} celebrations still use this type and will show its raw id",
                    in_use
                );
            }
        }
    }

    registry
        .save(&ctx.data_dir)
        .await
        .with_context(|| format!("Failed to save custom types in {}", ctx.data_dir.display()))?;

    Ok(())
}
