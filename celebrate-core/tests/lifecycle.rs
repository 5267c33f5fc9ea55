//! End-to-end store lifecycle over the file backends.

use celebrate_core::clock::FixedClock;
use celebrate_core::custom_types::{CustomType, CustomTypeRegistry};
use celebrate_core::date::LeapDayPolicy;
use celebrate_core::language::Language;
use celebrate_core::notifier::{FileNotifier, Notifier, due_reminders};
use celebrate_core::scheduler::{ReminderScheduler, ScheduleOutcome};
use celebrate_core::storage::{CelebrationStorage, JsonFileStorage};
use celebrate_core::store::{CelebrationStore, EffectKind, EffectOutcome};
use celebrate_core::{CelebrationInput, CelebrationKind, CelebrationPatch};
use chrono::{NaiveDate, NaiveDateTime};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

async fn open(
    dir: &std::path::Path,
    now: NaiveDateTime,
) -> (
    CelebrationStore<FixedClock>,
    JsonFileStorage,
    ReminderScheduler<FileNotifier>,
) {
    let storage = JsonFileStorage::in_dir(dir);
    let mut store = CelebrationStore::new(FixedClock::new(now));
    store.load_from(&storage).await.unwrap();

    let mut scheduler = ReminderScheduler::new(
        FileNotifier::in_dir(dir),
        Language::English,
        LeapDayPolicy::Feb28,
    );
    assert!(scheduler.initialize().await);

    (store, storage, scheduler)
}

#[tokio::test]
async fn records_and_reminders_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let registry = CustomTypeRegistry::default();

    let id = {
        let (mut store, storage, mut scheduler) = open(dir.path(), at(2024, 6, 15, 10)).await;
        let record = store.add_record(CelebrationInput {
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            date: "1990-07-26".into(),
            kind: CelebrationKind::Birthday,
            reminder_lead_time: Some(2),
            ..Default::default()
        });

        let reports = store
            .process_effects(&storage, &mut scheduler, &registry)
            .await;
        assert!(reports.iter().all(|r| r.is_ok()), "{reports:?}");
        record.id
    };

    let (store, storage, scheduler) = open(dir.path(), at(2024, 6, 16, 10)).await;
    assert_eq!(storage.load().await.unwrap().len(), 1);
    assert_eq!(store.get_record(&id).unwrap().first_name, "Ada");

    let pending: Vec<_> = scheduler.notifier().pending().collect();
    assert_eq!(pending.len(), 1);
    assert_eq!((pending[0].trigger.month, pending[0].trigger.day), (7, 24));
    assert_eq!(pending[0].content.body, "Ada Lovelace's birthday is in 2 days");
}

#[tokio::test]
async fn update_reschedules_and_remove_cancels_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let registry = CustomTypeRegistry::default();
    let (mut store, storage, mut scheduler) = open(dir.path(), at(2024, 6, 15, 10)).await;

    let record = store.add_record(CelebrationInput {
        first_name: "Jan".into(),
        date: "1985-06-24".into(),
        kind: CelebrationKind::Nameday,
        ..Default::default()
    });
    store
        .process_effects(&storage, &mut scheduler, &registry)
        .await;

    store.update_record(
        &record.id,
        CelebrationPatch {
            reminder_lead_time: Some(5),
            ..Default::default()
        },
    );
    let reports = store
        .process_effects(&storage, &mut scheduler, &registry)
        .await;
    let scheduled = reports
        .iter()
        .find(|r| r.kind == EffectKind::Schedule)
        .unwrap();
    match &scheduled.result {
        Ok(EffectOutcome::Reminder(ScheduleOutcome::Scheduled(plan))) => {
            assert_eq!(plan.trigger_date, NaiveDate::from_ymd_opt(2024, 6, 19).unwrap());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(scheduler.notifier().pending().count(), 1);

    store.remove_record(&record.id);
    store
        .process_effects(&storage, &mut scheduler, &registry)
        .await;

    let mut reopened = FileNotifier::in_dir(dir.path());
    reopened.initialize().await.unwrap();
    assert_eq!(reopened.pending().count(), 0);
    assert!(storage.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_type_reminder_uses_registry_name_and_fires_when_due() {
    let dir = tempfile::tempdir().unwrap();

    let mut registry = CustomTypeRegistry::default();
    registry
        .upsert(CustomType {
            id: "anniversary".into(),
            name: "Anniversary".into(),
            emoji: None,
        })
        .unwrap();
    registry.save(dir.path()).await.unwrap();
    let registry = CustomTypeRegistry::load(dir.path()).await.unwrap();

    let (mut store, storage, mut scheduler) = open(dir.path(), at(2024, 6, 15, 10)).await;
    store.add_record(CelebrationInput {
        first_name: "Mum & Dad".into(),
        date: "1970-09-12".into(),
        kind: CelebrationKind::Custom("anniversary".into()),
        reminder_lead_time: Some(0),
        ..Default::default()
    });
    store
        .process_effects(&storage, &mut scheduler, &registry)
        .await;

    let pending: Vec<_> = scheduler.notifier().pending().collect();
    assert_eq!(pending[0].content.title, "🎉 Anniversary reminder");
    assert_eq!(pending[0].content.body, "Mum & Dad: Anniversary today");

    let due = due_reminders(
        scheduler.notifier().pending(),
        at(2024, 9, 12, 8),
        at(2024, 9, 12, 9),
        LeapDayPolicy::Feb28,
    );
    assert_eq!(due.len(), 1);
}

#[tokio::test]
async fn corrupt_storage_keeps_store_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::in_dir(dir.path());
    std::fs::write(storage.path(), "{ not json").unwrap();

    let mut store = CelebrationStore::new(FixedClock::new(at(2024, 6, 15, 10)));
    assert!(store.load_from(&storage).await.is_err());
    assert!(!store.has_loaded());

    store.add_record(CelebrationInput {
        first_name: "Ada".into(),
        date: "1990-07-26".into(),
        ..Default::default()
    });
    assert!(
        store
            .pending_effects()
            .all(|e| !matches!(e, celebrate_core::store::Effect::Persist(_)))
    );
}
