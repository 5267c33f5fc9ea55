pub mod add;
pub mod checklist;
pub mod edit;
pub mod export;
pub mod list;
pub mod remind;
pub mod remove;
pub mod reschedule;
pub mod show;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::event::config::CelebrateConfig;
use crate::event::custom_types::{CustomTypeLookup, CustomTypeRegistry};
use crate::event::date::parse_calendar_date;
use crate::event::notifier::FileNotifier;
use crate::event::scheduler::ReminderScheduler;
use crate::event::storage::JsonFileStorage;
use crate::event::store::{CelebrationStore, EffectKind};
use crate::event::{Celebration, CelebrationKind};

/// Everything a command needs, loaded once per invocation.
pub struct Context {
    pub config: CelebrateConfig,
    pub data_dir: PathBuf,
    pub store: CelebrationStore,
    pub storage: JsonFileStorage,
    pub scheduler: ReminderScheduler<FileNotifier>,
    pub types: CustomTypeRegistry,
}

impl Context {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = CelebrateConfig::load(config_path)?;
        let data_dir = config.data_path();

        let storage = JsonFileStorage::in_dir(&data_dir);
        let mut store = CelebrationStore::default();
        store.load_from(&storage).await.with_context(|| {
            format!(
                "Failed to load celebrations from {}",
                storage.path().display()
            )
        })?;

        let types = CustomTypeRegistry::load(&data_dir)
            .await
            .with_context(|| format!("Failed to load custom types from {}", data_dir.display()))?;

        let mut scheduler = ReminderScheduler::new(
            FileNotifier::in_dir(&data_dir),
            config.language,
            config.leap_day,
        );
        if !scheduler.initialize().await {
            eprintln!("Warning: reminders are unavailable, changes won't be scheduled");
        }

        Ok(Context {
            config,
            data_dir,
            store,
            storage,
            scheduler,
            types,
        })
    }

    /// Resolve an exact id or a unique id prefix.
    pub fn resolve_id(&self, query: &str) -> Result<String> {
        if self.store.get_record(query).is_some() {
            return Ok(query.to_string());
        }

        let matches: Vec<&Celebration> = self
            .store
            .records()
            .iter()
            .filter(|r| r.id.starts_with(query))
            .collect();

        match matches.as_slice() {
            [one] => Ok(one.id.clone()),
            [] => anyhow::bail!("No celebration with id '{}'", query),
            many => anyhow::bail!(
                "Id '{}' is ambiguous, it matches: {}",
                query,
                many.iter()
                    .map(|r| r.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// Perform queued effects, printing a warning for each failure.
    /// Returns the number of failures.
    pub async fn finish(&mut self) -> usize {
        let reports = self
            .store
            .process_effects(&self.storage, &mut self.scheduler, &self.types)
            .await;

        let mut failures = 0;
        for report in &reports {
            if let Err(error) = &report.result {
                failures += 1;
                match report.kind {
                    EffectKind::Persist => eprintln!("Warning: could not save celebrations: {error}"),
                    EffectKind::Schedule | EffectKind::Cancel => eprintln!(
                        "Warning: could not update reminder for {}: {error}",
                        report.record_id.as_deref().unwrap_or("?")
                    ),
                }
            }
        }
        failures
    }
}

/// Reject dates whose month/day never exists.
pub fn validate_date(date: &str) -> Result<()> {
    let parsed = parse_calendar_date(date)?;
    if !parsed.is_valid_month_day() {
        anyhow::bail!("'{}' is not a valid date", date);
    }
    Ok(())
}

/// Custom kinds must be registered before use.
pub fn validate_kind(kind: &CelebrationKind, types: &dyn CustomTypeLookup) -> Result<()> {
    if let CelebrationKind::Custom(id) = kind
        && types.custom_type(id).is_none()
    {
        anyhow::bail!(
            "Unknown type '{}'.\n\
            Use birthday, nameday, other, or add it with `celebrate types add {} <name>`",
            id,
            id
        );
    }
    Ok(())
}
