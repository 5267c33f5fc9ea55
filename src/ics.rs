use anyhow::Result;
use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, EventLike};

use crate::event::Celebration;
use crate::event::custom_types::CustomTypeLookup;
use crate::event::date::{LeapDayPolicy, next_occurrence, parse_calendar_date};
use crate::event::language::Language;

/// Yearly rule for a month/day. Feb 29 needs a rule that still fires in common years.
fn yearly_rule(month: u32, day: u32, leap: LeapDayPolicy) -> &'static str {
    match (month, day, leap) {
        (2, 29, LeapDayPolicy::Feb28) => "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1",
        (2, 29, LeapDayPolicy::Mar1) => "FREQ=YEARLY;BYYEARDAY=60",
        _ => "FREQ=YEARLY",
    }
}

/// Generate an .ics calendar with one yearly all-day event per celebration.
///
/// Records whose date never occurs are left out.
pub fn generate_ics(
    records: &[Celebration],
    now: NaiveDateTime,
    leap: LeapDayPolicy,
    language: Language,
    lookup: &dyn CustomTypeLookup,
) -> Result<String> {
    let mut cal = Calendar::new();

    for record in records {
        let Ok(original) = parse_calendar_date(&record.date) else {
            continue;
        };
        // Years before the calendar epoch or impossible dates start from the next occurrence
        let Some(start) = original
            .to_naive()
            .or_else(|| next_occurrence(&original, now, leap))
        else {
            continue;
        };

        let kind = record.kind.display_name(lookup, language);

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&format!("{}@celebrate", record.id));
        ics_event.summary(&format!("{} ({})", record.display_name(), kind));
        ics_event.all_day(start);
        ics_event.add_property("RRULE", yearly_rule(original.month, original.day, leap));
        ics_event.add_property("TRANSP", "TRANSPARENT");

        if let Some(ref note) = record.note {
            ics_event.description(note);
        }

        cal.push(ics_event.done());
    }

    Ok(cal.done().to_string())
}
