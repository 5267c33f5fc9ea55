//! Turns a celebration's recurrence and lead time into one yearly reminder.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::celebration::{Celebration, CelebrationKind};
use crate::custom_types::CustomTypeLookup;
use crate::date::{LeapDayPolicy, add_one_year, next_occurrence, parse_calendar_date};
use crate::error::{CelebrateError, CelebrateResult};
use crate::language::Language;
use crate::notifier::{CalendarTrigger, NotificationContent, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    /// Next occurrence of the celebration itself
    pub occurrence: NaiveDate,
    /// First day the reminder fires on
    pub trigger_date: NaiveDate,
    pub trigger: CalendarTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled(ScheduledReminder),
    /// Reminders are off for this record; any old reminder was cancelled.
    Disabled,
    /// The record's date has no valid month/day, or its lead time can't be
    /// represented; any old reminder was cancelled.
    InvalidDate,
    /// `initialize` hasn't succeeded, nothing was touched.
    NotInitialized,
}

pub struct ReminderScheduler<N: Notifier> {
    notifier: N,
    language: Language,
    leap: LeapDayPolicy,
    initialized: bool,
}

impl<N: Notifier> ReminderScheduler<N> {
    pub fn new(notifier: N, language: Language, leap: LeapDayPolicy) -> Self {
        ReminderScheduler {
            notifier,
            language,
            leap,
            initialized: false,
        }
    }

    /// Initialize the notifier backend. Returns whether scheduling is possible.
    pub async fn initialize(&mut self) -> bool {
        self.initialized = match self.notifier.initialize().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "reminder scheduler unavailable");
                false
            }
        };
        self.initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn ensure_initialized(&self) -> CelebrateResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(CelebrateError::Notifier("scheduler not initialized".into()))
        }
    }

    /// Replace the record's reminder with one for its next cycle.
    ///
    /// The old reminder is always cancelled first, so at most one reminder
    /// exists per record no matter how often this runs.
    pub async fn schedule_reminder(
        &mut self,
        record: &Celebration,
        now: NaiveDateTime,
        lookup: &dyn CustomTypeLookup,
    ) -> CelebrateResult<ScheduleOutcome> {
        if !self.initialized {
            return Ok(ScheduleOutcome::NotInitialized);
        }

        self.notifier.cancel(&record.id).await?;

        if !record.reminder_enabled {
            debug!(id = %record.id, "reminder disabled");
            return Ok(ScheduleOutcome::Disabled);
        }

        let Some(plan) = plan_reminder(record, now, self.leap) else {
            warn!(
                id = %record.id,
                date = %record.date,
                lead_days = record.reminder_lead_time,
                "cannot schedule reminder for this date and lead time"
            );
            return Ok(ScheduleOutcome::InvalidDate);
        };

        let content = reminder_content(record, self.language, lookup);
        self.notifier
            .schedule(&record.id, plan.trigger, content)
            .await?;

        debug!(
            id = %record.id,
            occurrence = %plan.occurrence,
            trigger_date = %plan.trigger_date,
            "reminder scheduled"
        );
        Ok(ScheduleOutcome::Scheduled(plan))
    }

    pub async fn cancel_reminder(&mut self, id: &str) -> CelebrateResult<()> {
        self.ensure_initialized()?;
        self.notifier.cancel(id).await
    }

    pub async fn cancel_all(&mut self) -> CelebrateResult<()> {
        self.ensure_initialized()?;
        self.notifier.cancel_all().await
    }

    /// Drop every reminder and schedule each record again.
    pub async fn reschedule_all(
        &mut self,
        records: &[Celebration],
        now: NaiveDateTime,
        lookup: &dyn CustomTypeLookup,
    ) -> CelebrateResult<Vec<(String, CelebrateResult<ScheduleOutcome>)>> {
        self.cancel_all().await?;

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.schedule_reminder(record, now, lookup).await;
            outcomes.push((record.id.clone(), outcome));
        }
        Ok(outcomes)
    }
}

/// Work out when a record's reminder fires.
///
/// None for dates without a valid month/day, and for lead times that reach
/// outside the representable calendar.
pub fn plan_reminder(
    record: &Celebration,
    now: NaiveDateTime,
    leap: LeapDayPolicy,
) -> Option<ScheduledReminder> {
    let original = parse_calendar_date(&record.date).ok()?;
    let occurrence = next_occurrence(&original, now, leap)?;

    let lead = Days::new(u64::from(record.reminder_lead_time));
    let mut trigger_date = occurrence.checked_sub_days(lead)?;

    // The lead window for this cycle already started; remind for next year's instead
    if trigger_date.and_time(NaiveTime::MIN) < now {
        trigger_date = add_one_year(trigger_date, leap)?;
    }

    let time = record.reminder_time;
    Some(ScheduledReminder {
        occurrence,
        trigger_date,
        trigger: CalendarTrigger {
            month: trigger_date.month(),
            day: trigger_date.day(),
            hour: time.hour,
            minute: time.minute,
            repeats: true,
            lead_days: record.reminder_lead_time,
        },
    })
}

/// Localized title and body for a record's reminder.
pub fn reminder_content(
    record: &Celebration,
    language: Language,
    lookup: &dyn CustomTypeLookup,
) -> NotificationContent {
    let name = record.display_name();
    let when = language.relative_days(i64::from(record.reminder_lead_time));
    let kind_name = record.kind.display_name(lookup, language);

    let (title, body) = match (&record.kind, language) {
        (CelebrationKind::Birthday, Language::English) => (
            "🎂 Birthday reminder".to_string(),
            format!("{name}'s birthday is {when}"),
        ),
        (CelebrationKind::Birthday, Language::Czech) => (
            "🎂 Připomínka narozenin".to_string(),
            format!("{name} má narozeniny {when}"),
        ),
        (CelebrationKind::Birthday, Language::German) => (
            "🎂 Geburtstagserinnerung".to_string(),
            format!("{name} hat {when} Geburtstag"),
        ),
        (CelebrationKind::Nameday, Language::English) => (
            "🌸 Nameday reminder".to_string(),
            format!("{name}'s nameday is {when}"),
        ),
        (CelebrationKind::Nameday, Language::Czech) => (
            "🌸 Připomínka svátku".to_string(),
            format!("{name} má svátek {when}"),
        ),
        (CelebrationKind::Nameday, Language::German) => (
            "🌸 Namenstagserinnerung".to_string(),
            format!("{name} hat {when} Namenstag"),
        ),
        (CelebrationKind::Other, Language::English) => (
            "🎉 Celebration reminder".to_string(),
            format!("{name}: celebration {when}"),
        ),
        (CelebrationKind::Other, Language::Czech) => (
            "🎉 Připomínka oslavy".to_string(),
            format!("{name}: oslava {when}"),
        ),
        (CelebrationKind::Other, Language::German) => (
            "🎉 Erinnerung".to_string(),
            format!("{name}: Feier {when}"),
        ),
        (CelebrationKind::Custom(_), Language::English) => (
            format!("🎉 {kind_name} reminder"),
            format!("{name}: {kind_name} {when}"),
        ),
        (CelebrationKind::Custom(_), Language::Czech) => (
            format!("🎉 Připomínka: {kind_name}"),
            format!("{name}: {kind_name} {when}"),
        ),
        (CelebrationKind::Custom(_), Language::German) => (
            format!("🎉 Erinnerung: {kind_name}"),
            format!("{name}: {kind_name} {when}"),
        ),
    };

    NotificationContent {
        title,
        body,
        record_id: record.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celebration::{CelebrationInput, ReminderTime};
    use crate::custom_types::NoCustomTypes;
    use crate::notifier::{MemoryNotifier, NotifierCall};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, date: &str, lead: u32) -> Celebration {
        let input = CelebrationInput {
            first_name: "Ada".to_string(),
            date: date.to_string(),
            reminder_lead_time: Some(lead),
            reminder_time: Some(ReminderTime { hour: 8, minute: 30 }),
            ..Default::default()
        };
        Celebration::from_input(id.to_string(), input, now())
    }

    async fn scheduler() -> ReminderScheduler<MemoryNotifier> {
        let mut scheduler = ReminderScheduler::new(
            MemoryNotifier::default(),
            Language::English,
            LeapDayPolicy::Feb28,
        );
        assert!(scheduler.initialize().await);
        scheduler
    }

    #[tokio::test]
    async fn test_trigger_is_lead_days_before_occurrence() {
        let mut scheduler = scheduler().await;
        let rec = record("r1", "1990-07-26", 7);

        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        let plan = match outcome {
            ScheduleOutcome::Scheduled(plan) => plan,
            other => panic!("expected a scheduled reminder, got {other:?}"),
        };
        assert_eq!(plan.occurrence, ymd(2024, 7, 26));
        assert_eq!(plan.trigger_date, ymd(2024, 7, 19));
        assert_eq!(
            plan.trigger,
            CalendarTrigger {
                month: 7,
                day: 19,
                hour: 8,
                minute: 30,
                repeats: true,
                lead_days: 7,
            }
        );

        let pending = &scheduler.notifier().pending()["r1"];
        assert_eq!(pending.content.body, "Ada's birthday is in 7 days");
        assert_eq!(pending.content.record_id, "r1");
    }

    #[tokio::test]
    async fn test_scheduling_twice_leaves_one_reminder() {
        let mut scheduler = scheduler().await;
        let rec = record("r1", "1990-07-26", 1);

        scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();
        scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        assert_eq!(scheduler.notifier().pending().len(), 1);
        assert_eq!(
            scheduler.notifier().calls(),
            &[
                NotifierCall::Cancel("r1".to_string()),
                NotifierCall::Schedule("r1".to_string()),
                NotifierCall::Cancel("r1".to_string()),
                NotifierCall::Schedule("r1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_elapsed_lead_window_rolls_to_next_year() {
        let mut scheduler = scheduler().await;
        // Occurs in 5 days but the reminder wants 30 days of notice
        let rec = record("r1", "1980-06-20", 30);

        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        let plan = match outcome {
            ScheduleOutcome::Scheduled(plan) => plan,
            other => panic!("expected a scheduled reminder, got {other:?}"),
        };
        assert_eq!(plan.occurrence, ymd(2024, 6, 20));
        assert_eq!(plan.trigger_date, ymd(2025, 5, 21));
        assert_eq!((plan.trigger.month, plan.trigger.day), (5, 21));
    }

    #[tokio::test]
    async fn test_unrepresentable_lead_time_is_not_scheduled() {
        let mut scheduler = scheduler().await;
        let rec = record("r1", "1990-07-26", u32::MAX);

        assert_eq!(plan_reminder(&rec, now(), LeapDayPolicy::Feb28), None);

        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();
        assert_eq!(outcome, ScheduleOutcome::InvalidDate);
        assert!(scheduler.notifier().pending().is_empty());
    }

    #[test]
    fn test_leap_day_trigger_for_march_first_keeps_lead() {
        // Scheduled in a leap year, one day before Mar 1 is Feb 29
        let rec = record("r1", "1990-03-01", 1);
        let january = ymd(2024, 1, 10).and_hms_opt(12, 0, 0).unwrap();
        let plan = plan_reminder(&rec, january, LeapDayPolicy::Mar1).unwrap();

        assert_eq!(plan.trigger_date, ymd(2024, 2, 29));
        assert_eq!(plan.trigger.lead_days, 1);
    }

    #[test]
    fn test_same_day_reminder_rolls_once_midnight_passed() {
        let rec = record("r1", "2000-06-15", 0);
        let plan = plan_reminder(&rec, now(), LeapDayPolicy::Feb28).unwrap();

        assert_eq!(plan.occurrence, ymd(2024, 6, 15));
        assert_eq!(plan.trigger_date, ymd(2025, 6, 15));
        assert_eq!((plan.trigger.month, plan.trigger.day), (6, 15));
    }

    #[tokio::test]
    async fn test_disabled_reminder_only_cancels() {
        let mut scheduler = scheduler().await;
        let mut rec = record("r1", "1990-07-26", 1);
        scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        rec.reminder_enabled = false;
        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        assert_eq!(outcome, ScheduleOutcome::Disabled);
        assert!(scheduler.notifier().pending().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date_is_reported_not_scheduled() {
        let mut scheduler = scheduler().await;
        let rec = record("r1", "1990-02-30", 1);

        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        assert_eq!(outcome, ScheduleOutcome::InvalidDate);
        assert!(scheduler.notifier().pending().is_empty());
    }

    #[tokio::test]
    async fn test_uninitialized_scheduler_does_nothing() {
        let mut scheduler = ReminderScheduler::new(
            MemoryNotifier::denied(),
            Language::English,
            LeapDayPolicy::Feb28,
        );
        assert!(!scheduler.initialize().await);

        let rec = record("r1", "1990-07-26", 1);
        let outcome = scheduler
            .schedule_reminder(&rec, now(), &NoCustomTypes)
            .await
            .unwrap();

        assert_eq!(outcome, ScheduleOutcome::NotInitialized);
        assert!(scheduler.notifier().calls().is_empty());
        assert!(scheduler.cancel_reminder("r1").await.is_err());
    }

    #[test]
    fn test_content_is_localized_by_kind() {
        let mut rec = record("r1", "1990-06-24", 1);
        rec.kind = CelebrationKind::Nameday;
        rec.last_name = Some("Novák".to_string());

        let content = reminder_content(&rec, Language::Czech, &NoCustomTypes);
        assert_eq!(content.title, "🌸 Připomínka svátku");
        assert_eq!(content.body, "Ada Novák má svátek zítra");

        rec.kind = CelebrationKind::Custom("graduation".to_string());
        let content = reminder_content(&rec, Language::English, &NoCustomTypes);
        assert_eq!(content.title, "🎉 graduation reminder");
    }

    #[tokio::test]
    async fn test_reschedule_all_starts_from_scratch() {
        let mut scheduler = scheduler().await;
        let stale = record("stale", "1990-01-01", 1);
        scheduler
            .schedule_reminder(&stale, now(), &NoCustomTypes)
            .await
            .unwrap();

        let records = vec![record("a", "1990-07-26", 1), record("b", "1991-08-01", 2)];
        let outcomes = scheduler
            .reschedule_all(&records, now(), &NoCustomTypes)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        let pending: Vec<&String> = scheduler.notifier().pending().keys().collect();
        assert_eq!(pending, vec!["a", "b"]);
    }
}
