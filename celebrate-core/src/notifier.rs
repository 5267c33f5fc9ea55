//! Notification collaborator.
//!
//! A notifier holds at most one pending reminder per key. Keys are record ids,
//! so scheduling the same record twice replaces the earlier entry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date::{LeapDayPolicy, resolve_in_year};
use crate::error::{CelebrateError, CelebrateResult};

const REMINDERS_FILE: &str = "reminders.json";
const DELIVERY_STATE_FILE: &str = "remind_state.json";

/// Calendar-based trigger: fires at month/day hour:minute, every year when `repeats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTrigger {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
    /// Days between the trigger and the occurrence it announces
    #[serde(default)]
    pub lead_days: u32,
}

impl CalendarTrigger {
    /// The day this trigger fires on in `year`.
    ///
    /// A Feb 29 trigger with a lead time announces a day after Feb 29, so in
    /// common years it keeps its distance to that day. Only a trigger on the
    /// celebration day itself follows the leap day policy.
    pub fn date_in_year(&self, year: i32, leap: LeapDayPolicy) -> Option<NaiveDate> {
        let leap_day_missing = NaiveDate::from_ymd_opt(year, 2, 29).is_none();
        if self.month == 2 && self.day == 29 && self.lead_days > 0 && leap_day_missing {
            let lead = Days::new(u64::from(self.lead_days));
            let announced = NaiveDate::from_ymd_opt(2000, 2, 29)?.checked_add_days(lead)?;
            let occurrence = resolve_in_year(
                year + (announced.year() - 2000),
                announced.month(),
                announced.day(),
                leap,
            )?;
            return occurrence.checked_sub_days(lead);
        }

        resolve_in_year(year, self.month, self.day, leap)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// Record to open when the notification is activated
    pub record_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReminder {
    pub id: String,
    pub trigger: CalendarTrigger,
    pub content: NotificationContent,
}

#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Prepare the backend (permissions, storage). Must succeed before scheduling.
    async fn initialize(&mut self) -> CelebrateResult<()>;

    /// Register a reminder under `id`, replacing any existing one.
    async fn schedule(
        &mut self,
        id: &str,
        trigger: CalendarTrigger,
        content: NotificationContent,
    ) -> CelebrateResult<()>;

    /// Remove the reminder under `id`. No-op when there is none.
    async fn cancel(&mut self, id: &str) -> CelebrateResult<()>;

    async fn cancel_all(&mut self) -> CelebrateResult<()>;
}

/// Keeps pending reminders in `<data_dir>/reminders.json` for the `remind` loop to fire.
pub struct FileNotifier {
    path: PathBuf,
    pending: BTreeMap<String, PendingReminder>,
}

impl FileNotifier {
    pub fn in_dir(data_dir: &Path) -> Self {
        FileNotifier {
            path: data_dir.join(REMINDERS_FILE),
            pending: BTreeMap::new(),
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingReminder> {
        self.pending.values()
    }

    async fn write(&self) -> CelebrateResult<()> {
        let entries: Vec<&PendingReminder> = self.pending.values().collect();
        let content = serde_json::to_string_pretty(&entries)?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

impl Notifier for FileNotifier {
    async fn initialize(&mut self) -> CelebrateResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CelebrateError::Notifier(format!("Could not create {}: {}", parent.display(), e))
            })?;
        }

        if !tokio::fs::try_exists(&self.path).await? {
            self.pending.clear();
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries: Vec<PendingReminder> = serde_json::from_str(&content).map_err(|e| {
            CelebrateError::Notifier(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        self.pending = entries.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(())
    }

    async fn schedule(
        &mut self,
        id: &str,
        trigger: CalendarTrigger,
        content: NotificationContent,
    ) -> CelebrateResult<()> {
        self.pending.insert(
            id.to_string(),
            PendingReminder {
                id: id.to_string(),
                trigger,
                content,
            },
        );
        self.write().await
    }

    async fn cancel(&mut self, id: &str) -> CelebrateResult<()> {
        if self.pending.remove(id).is_some() {
            self.write().await?;
        }
        Ok(())
    }

    async fn cancel_all(&mut self) -> CelebrateResult<()> {
        self.pending.clear();
        self.write().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Schedule(String),
    Cancel(String),
    CancelAll,
}

/// In-memory notifier that records every call.
#[derive(Default)]
pub struct MemoryNotifier {
    pending: BTreeMap<String, PendingReminder>,
    calls: Vec<NotifierCall>,
    deny_permission: bool,
    fail_schedule: bool,
}

impl MemoryNotifier {
    /// A notifier whose initialization fails, as when the user denies permission.
    pub fn denied() -> Self {
        MemoryNotifier {
            deny_permission: true,
            ..Default::default()
        }
    }

    /// A notifier that accepts initialization but rejects every schedule call.
    pub fn failing() -> Self {
        MemoryNotifier {
            fail_schedule: true,
            ..Default::default()
        }
    }

    pub fn pending(&self) -> &BTreeMap<String, PendingReminder> {
        &self.pending
    }

    pub fn calls(&self) -> &[NotifierCall] {
        &self.calls
    }
}

impl Notifier for MemoryNotifier {
    async fn initialize(&mut self) -> CelebrateResult<()> {
        if self.deny_permission {
            return Err(CelebrateError::Notifier("notification permission denied".into()));
        }
        Ok(())
    }

    async fn schedule(
        &mut self,
        id: &str,
        trigger: CalendarTrigger,
        content: NotificationContent,
    ) -> CelebrateResult<()> {
        self.calls.push(NotifierCall::Schedule(id.to_string()));
        if self.fail_schedule {
            return Err(CelebrateError::Notifier("platform rejected schedule".into()));
        }

        self.pending.insert(
            id.to_string(),
            PendingReminder {
                id: id.to_string(),
                trigger,
                content,
            },
        );
        Ok(())
    }

    async fn cancel(&mut self, id: &str) -> CelebrateResult<()> {
        self.calls.push(NotifierCall::Cancel(id.to_string()));
        self.pending.remove(id);
        Ok(())
    }

    async fn cancel_all(&mut self) -> CelebrateResult<()> {
        self.calls.push(NotifierCall::CancelAll);
        self.pending.clear();
        Ok(())
    }
}

/// Reminders whose trigger moment falls in `(since, now]`.
///
/// Repeating triggers are checked in every year the window touches. Feb 29
/// triggers resolve in other years as described on [`CalendarTrigger::date_in_year`].
pub fn due_reminders<'a>(
    pending: impl IntoIterator<Item = &'a PendingReminder>,
    since: NaiveDateTime,
    now: NaiveDateTime,
    leap: LeapDayPolicy,
) -> Vec<&'a PendingReminder> {
    if now <= since {
        return Vec::new();
    }

    pending
        .into_iter()
        .filter(|reminder| {
            let t = &reminder.trigger;
            let years = if t.repeats {
                since.year()..=now.year()
            } else {
                now.year()..=now.year()
            };

            years.into_iter().any(|year| {
                t.date_in_year(year, leap)
                    .and_then(|date| date.and_hms_opt(t.hour, t.minute, 0))
                    .is_some_and(|at| at > since && at <= now)
            })
        })
        .collect()
}

/// When the `remind` loop last looked for due reminders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryState {
    pub last_checked: Option<NaiveDateTime>,
}

impl DeliveryState {
    pub async fn load(data_dir: &Path) -> CelebrateResult<Self> {
        let path = data_dir.join(DELIVERY_STATE_FILE);

        if !tokio::fs::try_exists(&path).await? {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, data_dir: &Path) -> CelebrateResult<()> {
        tokio::fs::create_dir_all(data_dir).await?;
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(data_dir.join(DELIVERY_STATE_FILE), content).await?;
        Ok(())
    }
}
