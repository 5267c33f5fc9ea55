//! Celebration records.
//!
//! A celebration is one tracked yearly occasion: a birthday, a nameday, some
//! other date, or an occasion of a user-defined type. Records are stored as a
//! JSON array with camelCase keys.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::custom_types::CustomTypeLookup;
use crate::error::CelebrateError;
use crate::language::Language;

pub const DEFAULT_LEAD_DAYS: u32 = 1;

/// Kind of occasion. Anything that isn't one of the fixed kinds refers to a
/// user-defined type by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CelebrationKind {
    #[default]
    Birthday,
    Nameday,
    Other,
    Custom(String),
}

impl CelebrationKind {
    pub fn as_str(&self) -> &str {
        match self {
            CelebrationKind::Birthday => "birthday",
            CelebrationKind::Nameday => "nameday",
            CelebrationKind::Other => "other",
            CelebrationKind::Custom(id) => id,
        }
    }

    /// Human-readable name. Custom kinds are resolved through `lookup`;
    /// unknown custom ids show as the raw id.
    pub fn display_name(&self, lookup: &dyn CustomTypeLookup, language: Language) -> String {
        match (self, language) {
            (CelebrationKind::Custom(id), _) => lookup
                .custom_type(id)
                .map(|t| t.label())
                .unwrap_or_else(|| id.clone()),
            (CelebrationKind::Birthday, Language::English) => "Birthday".to_string(),
            (CelebrationKind::Birthday, Language::Czech) => "Narozeniny".to_string(),
            (CelebrationKind::Birthday, Language::German) => "Geburtstag".to_string(),
            (CelebrationKind::Nameday, Language::English) => "Nameday".to_string(),
            (CelebrationKind::Nameday, Language::Czech) => "Svátek".to_string(),
            (CelebrationKind::Nameday, Language::German) => "Namenstag".to_string(),
            (CelebrationKind::Other, Language::English) => "Celebration".to_string(),
            (CelebrationKind::Other, Language::Czech) => "Oslava".to_string(),
            (CelebrationKind::Other, Language::German) => "Feier".to_string(),
        }
    }
}

impl From<String> for CelebrationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "birthday" => CelebrationKind::Birthday,
            "nameday" => CelebrationKind::Nameday,
            "other" => CelebrationKind::Other,
            _ => CelebrationKind::Custom(s),
        }
    }
}

impl From<CelebrationKind> for String {
    fn from(kind: CelebrationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for CelebrationKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CelebrationKind::from(s.trim().to_string()))
    }
}

impl fmt::Display for CelebrationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wall-clock time of day a reminder fires at.
///
/// Stored as "HH:MM". Values that don't parse fall back to 09:00 on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ReminderTime {
    pub hour: u32,
    pub minute: u32,
}

impl Default for ReminderTime {
    fn default() -> Self {
        ReminderTime { hour: 9, minute: 0 }
    }
}

impl ReminderTime {
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ReminderTime {
    type Err = CelebrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CelebrateError::InvalidTime(s.to_string());

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;

        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(ReminderTime { hour, minute })
    }
}

impl From<String> for ReminderTime {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<ReminderTime> for String {
    fn from(time: ReminderTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One entry of a record's checklist (gift ideas, things to prepare).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

fn default_true() -> bool {
    true
}

fn default_lead_days() -> u32 {
    DEFAULT_LEAD_DAYS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Celebration {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// ISO `YYYY-MM-DD`; only month/day recur.
    pub date: String,
    #[serde(rename = "type", default)]
    pub kind: CelebrationKind,

    // Reminder
    #[serde(default = "default_true")]
    pub reminder_enabled: bool,
    /// Days before the occurrence
    #[serde(default = "default_lead_days")]
    pub reminder_lead_time: u32,
    #[serde(default)]
    pub reminder_time: ReminderTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Linked address book record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<ChecklistItem>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Celebration {
    /// Build a record from caller input, filling reminder defaults.
    pub fn from_input(id: String, input: CelebrationInput, now: NaiveDateTime) -> Self {
        Celebration {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            date: input.date,
            kind: input.kind,
            reminder_enabled: input.reminder_enabled.unwrap_or(true),
            reminder_lead_time: input.reminder_lead_time.unwrap_or(DEFAULT_LEAD_DAYS),
            reminder_time: input.reminder_time.unwrap_or_default(),
            note: input.note,
            phone: input.phone,
            contact_id: input.contact_id,
            checklist: input.checklist,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Generate a record id: millisecond timestamp plus a random suffix.
///
/// Readable and sortable, not cryptographically unique.
pub fn generate_id(now: NaiveDateTime) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.and_utc().timestamp_millis(), &suffix[..8])
}

/// What a caller supplies to create a record. Reminder fields left as None
/// get the defaults (enabled, 1 day before, 09:00).
#[derive(Debug, Clone, Default)]
pub struct CelebrationInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub date: String,
    pub kind: CelebrationKind,
    pub reminder_enabled: Option<bool>,
    pub reminder_lead_time: Option<u32>,
    pub reminder_time: Option<ReminderTime>,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub contact_id: Option<String>,
    pub checklist: Vec<ChecklistItem>,
}

/// Partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct CelebrationPatch {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub date: Option<String>,
    pub kind: Option<CelebrationKind>,
    pub reminder_enabled: Option<bool>,
    pub reminder_lead_time: Option<u32>,
    pub reminder_time: Option<ReminderTime>,
    pub note: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub contact_id: Option<Option<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl CelebrationPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date.is_none()
            && self.kind.is_none()
            && self.reminder_enabled.is_none()
            && self.reminder_lead_time.is_none()
            && self.reminder_time.is_none()
            && self.note.is_none()
            && self.phone.is_none()
            && self.contact_id.is_none()
            && self.checklist.is_none()
    }

    /// Shallow-merge the set fields over `record`. Id and timestamps are untouched.
    pub fn apply(self, record: &mut Celebration) {
        if let Some(v) = self.first_name {
            record.first_name = v;
        }
        if let Some(v) = self.last_name {
            record.last_name = v;
        }
        if let Some(v) = self.date {
            record.date = v;
        }
        if let Some(v) = self.kind {
            record.kind = v;
        }
        if let Some(v) = self.reminder_enabled {
            record.reminder_enabled = v;
        }
        if let Some(v) = self.reminder_lead_time {
            record.reminder_lead_time = v;
        }
        if let Some(v) = self.reminder_time {
            record.reminder_time = v;
        }
        if let Some(v) = self.note {
            record.note = v;
        }
        if let Some(v) = self.phone {
            record.phone = v;
        }
        if let Some(v) = self.contact_id {
            record.contact_id = v;
        }
        if let Some(v) = self.checklist {
            record.checklist = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&CelebrationKind::Nameday).unwrap();
        assert_eq!(json, "\"nameday\"");

        let custom: CelebrationKind = serde_json::from_str("\"anniversary-1\"").unwrap();
        assert_eq!(custom, CelebrationKind::Custom("anniversary-1".to_string()));
    }

    #[test]
    fn test_reminder_time_parse() {
        assert_eq!(
            "07:05".parse::<ReminderTime>().unwrap(),
            ReminderTime { hour: 7, minute: 5 }
        );
        assert!("24:00".parse::<ReminderTime>().is_err());
        assert!("9am".parse::<ReminderTime>().is_err());
        assert_eq!(ReminderTime::from("garbage".to_string()), ReminderTime::default());
        assert_eq!(ReminderTime { hour: 8, minute: 3 }.to_string(), "08:03");
    }

    #[test]
    fn test_from_input_fills_defaults() {
        let input = CelebrationInput {
            first_name: "Ada".to_string(),
            date: "1990-07-26".to_string(),
            ..Default::default()
        };
        let record = Celebration::from_input("id-1".to_string(), input, now());

        assert!(record.reminder_enabled);
        assert_eq!(record.reminder_lead_time, 1);
        assert_eq!(record.reminder_time, ReminderTime { hour: 9, minute: 0 });
        assert_eq!(record.kind, CelebrationKind::Birthday);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_stored_json_uses_camel_case_and_type_key() {
        let json = r#"{
            "id": "1718445600000-abc",
            "firstName": "Jan",
            "date": "1985-06-24",
            "type": "nameday",
            "reminderLeadTime": 3,
            "reminderTime": "18:30",
            "createdAt": "2024-06-15T10:00:00",
            "updatedAt": "2024-06-15T10:00:00"
        }"#;

        let record: Celebration = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, CelebrationKind::Nameday);
        assert!(record.reminder_enabled);
        assert_eq!(record.reminder_lead_time, 3);
        assert_eq!(record.reminder_time, ReminderTime { hour: 18, minute: 30 });
        assert!(record.checklist.is_empty());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["type"], "nameday");
        assert_eq!(out["reminderTime"], "18:30");
        assert!(out.get("note").is_none());
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let input = CelebrationInput {
            first_name: "Ada".to_string(),
            note: Some("likes tea".to_string()),
            date: "1990-07-26".to_string(),
            ..Default::default()
        };
        let mut record = Celebration::from_input("id-1".to_string(), input, now());

        let patch = CelebrationPatch {
            reminder_lead_time: Some(7),
            note: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut record);

        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.reminder_lead_time, 7);
        assert_eq!(record.note, None);
        assert_eq!(record.id, "id-1");
    }

    #[test]
    fn test_generate_id_is_unique_per_call() {
        let a = generate_id(now());
        let b = generate_id(now());
        assert_ne!(a, b);
        assert!(a.starts_with(&now().and_utc().timestamp_millis().to_string()));
    }
}
