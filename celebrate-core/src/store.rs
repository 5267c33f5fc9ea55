//! The authoritative in-memory list of celebrations.
//!
//! All mutation goes through [`reduce`], a pure transition over four actions.
//! The caller-facing operations on [`CelebrationStore`] assign ids and
//! timestamps, dispatch an action, and queue the side effects the change needs
//! (persist the list, schedule or cancel a reminder). Nothing is performed
//! until [`CelebrationStore::process_effects`] drains the queue, which reports
//! every outcome instead of letting failures vanish.

use std::collections::VecDeque;
use std::mem;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::celebration::{Celebration, CelebrationInput, CelebrationPatch, ChecklistItem, generate_id};
use crate::clock::{Clock, SystemClock};
use crate::custom_types::CustomTypeLookup;
use crate::date::{LeapDayPolicy, age_turning, days_until, next_occurrence, parse_calendar_date};
use crate::error::CelebrateResult;
use crate::notifier::Notifier;
use crate::scheduler::{ReminderScheduler, ScheduleOutcome};
use crate::storage::CelebrationStorage;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub records: Vec<Celebration>,
    pub has_loaded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the whole list. Sent once, after reading storage.
    Load(Vec<Celebration>),
    Add(Celebration),
    /// Replace the record with the same id. No-op for unknown ids.
    Update(Celebration),
    /// No-op for unknown ids.
    Remove(String),
}

pub fn reduce(mut state: StoreState, action: Action) -> StoreState {
    match action {
        Action::Load(records) => {
            state.records = records;
            state.has_loaded = true;
        }
        Action::Add(record) => state.records.push(record),
        Action::Update(record) => {
            if let Some(existing) = state.records.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            }
        }
        Action::Remove(id) => state.records.retain(|r| r.id != id),
    }
    state
}

/// Work queued by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write this snapshot of the list to storage
    Persist(Vec<Celebration>),
    Schedule(Celebration),
    Cancel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Persist,
    Schedule,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    Persisted { count: usize },
    Reminder(ScheduleOutcome),
    Cancelled,
}

/// What happened to one queued effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectReport {
    pub kind: EffectKind,
    pub record_id: Option<String>,
    pub result: Result<EffectOutcome, String>,
}

impl EffectReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A record together with where it falls relative to a reference day.
#[derive(Debug, Clone, PartialEq)]
pub struct Upcoming<'a> {
    pub record: &'a Celebration,
    pub occurrence: chrono::NaiveDate,
    pub days_until: i64,
    pub age_turning: Option<i32>,
}

pub struct CelebrationStore<C: Clock = SystemClock> {
    state: StoreState,
    outbox: VecDeque<Effect>,
    clock: C,
}

impl Default for CelebrationStore<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> CelebrationStore<C> {
    pub fn new(clock: C) -> Self {
        CelebrationStore {
            state: StoreState::default(),
            outbox: VecDeque::new(),
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn dispatch(&mut self, action: Action) {
        let next = reduce(self.state.clone(), action);
        let changed = next.records != self.state.records || next.has_loaded != self.state.has_loaded;
        self.state = next;

        if changed && self.state.has_loaded {
            self.outbox
                .push_back(Effect::Persist(self.state.records.clone()));
        }
    }

    // LOADING:

    /// Read the stored list and mark the store loaded.
    ///
    /// On a read failure the store stays unloaded, so no persist effect can
    /// overwrite the stored data with an empty list.
    pub async fn load_from<S: CelebrationStorage>(&mut self, storage: &S) -> CelebrateResult<usize> {
        let records = storage.load().await?;
        let count = records.len();
        self.load(records);
        debug!(count, "celebrations loaded");
        Ok(count)
    }

    pub fn load(&mut self, records: Vec<Celebration>) {
        self.dispatch(Action::Load(records));
    }

    pub fn has_loaded(&self) -> bool {
        self.state.has_loaded
    }

    // READS:

    pub fn records(&self) -> &[Celebration] {
        &self.state.records
    }

    pub fn get_record(&self, id: &str) -> Option<&Celebration> {
        self.state.records.iter().find(|r| r.id == id)
    }

    /// Records ordered by how soon they next occur; ties by name.
    /// Records with an unusable date are left out.
    pub fn upcoming(&self, leap: LeapDayPolicy) -> Vec<Upcoming<'_>> {
        let reference = self.clock.now();

        let mut upcoming: Vec<Upcoming> = self
            .state
            .records
            .iter()
            .filter_map(|record| {
                let original = parse_calendar_date(&record.date).ok()?;
                let occurrence = next_occurrence(&original, reference, leap)?;
                Some(Upcoming {
                    record,
                    occurrence,
                    days_until: days_until(occurrence, reference),
                    age_turning: age_turning(record, reference, leap),
                })
            })
            .collect();

        upcoming.sort_by(|a, b| {
            a.days_until
                .cmp(&b.days_until)
                .then_with(|| a.record.display_name().cmp(&b.record.display_name()))
        });
        upcoming
    }

    // MUTATIONS:

    /// Create a record from `input`. Its reminder is queued for scheduling.
    pub fn add_record(&mut self, input: CelebrationInput) -> Celebration {
        let now = self.clock.now();
        let record = Celebration::from_input(generate_id(now), input, now);

        self.dispatch(Action::Add(record.clone()));
        self.outbox.push_back(Effect::Schedule(record.clone()));

        debug!(id = %record.id, "celebration added");
        record
    }

    /// Merge `patch` into the record and queue a reschedule.
    ///
    /// Returns None, leaving the store untouched, when the id is unknown.
    pub fn update_record(&mut self, id: &str, patch: CelebrationPatch) -> Option<Celebration> {
        let Some(existing) = self.get_record(id) else {
            debug!(id, "update for unknown celebration ignored");
            return None;
        };

        let mut updated = existing.clone();
        patch.apply(&mut updated);
        updated.updated_at = self.clock.now();

        self.dispatch(Action::Update(updated.clone()));
        self.outbox.push_back(Effect::Schedule(updated.clone()));
        Some(updated)
    }

    /// Drop the record and queue cancellation of its reminder.
    ///
    /// The cancel is queued even for unknown ids; cancelling nothing is harmless.
    pub fn remove_record(&mut self, id: &str) -> Option<Celebration> {
        let removed = self.get_record(id).cloned();

        self.dispatch(Action::Remove(id.to_string()));
        self.outbox.push_back(Effect::Cancel(id.to_string()));

        if removed.is_none() {
            debug!(id, "remove for unknown celebration");
        }
        removed
    }

    pub fn add_checklist_item(&mut self, id: &str, text: &str) -> Option<Celebration> {
        let mut checklist = self.get_record(id)?.checklist.clone();
        checklist.push(ChecklistItem {
            text: text.to_string(),
            done: false,
        });

        self.update_record(
            id,
            CelebrationPatch {
                checklist: Some(checklist),
                ..Default::default()
            },
        )
    }

    /// Flip the done flag of the item at `index`. None if either id or index is unknown.
    pub fn toggle_checklist_item(&mut self, id: &str, index: usize) -> Option<Celebration> {
        let mut checklist = self.get_record(id)?.checklist.clone();
        let item = checklist.get_mut(index)?;
        item.done = !item.done;

        self.update_record(
            id,
            CelebrationPatch {
                checklist: Some(checklist),
                ..Default::default()
            },
        )
    }

    // EFFECTS:

    pub fn pending_effects(&self) -> impl Iterator<Item = &Effect> {
        self.outbox.iter()
    }

    /// Take the queued effects without performing them.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        mem::take(&mut self.outbox).into()
    }

    /// Perform every queued effect in order.
    ///
    /// Failures are logged and reported, never returned as errors and never
    /// retried. In-memory state is not rolled back.
    pub async fn process_effects<S, N>(
        &mut self,
        storage: &S,
        scheduler: &mut ReminderScheduler<N>,
        lookup: &dyn CustomTypeLookup,
    ) -> Vec<EffectReport>
    where
        S: CelebrationStorage,
        N: Notifier,
    {
        let mut reports = Vec::with_capacity(self.outbox.len());

        while let Some(effect) = self.outbox.pop_front() {
            let report = match effect {
                Effect::Persist(records) => EffectReport {
                    kind: EffectKind::Persist,
                    record_id: None,
                    result: storage
                        .save(&records)
                        .await
                        .map(|()| EffectOutcome::Persisted {
                            count: records.len(),
                        })
                        .map_err(|e| e.to_string()),
                },
                Effect::Schedule(record) => EffectReport {
                    kind: EffectKind::Schedule,
                    result: scheduler
                        .schedule_reminder(&record, self.clock.now(), lookup)
                        .await
                        .map(EffectOutcome::Reminder)
                        .map_err(|e| e.to_string()),
                    record_id: Some(record.id),
                },
                Effect::Cancel(id) => EffectReport {
                    kind: EffectKind::Cancel,
                    result: scheduler
                        .cancel_reminder(&id)
                        .await
                        .map(|()| EffectOutcome::Cancelled)
                        .map_err(|e| e.to_string()),
                    record_id: Some(id),
                },
            };

            if let Err(error) = &report.result {
                warn!(kind = ?report.kind, id = ?report.record_id, %error, "effect failed");
            }
            reports.push(report);
        }

        reports
    }
}
