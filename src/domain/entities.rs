//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/IO types here; adapters map into these.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DomainError;

/// Wire format for schedule start times and booked appointment times (24-hour).
pub const TIME_FORMAT: &str = "%H:%M";

/// One recurring weekly availability entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(with = "weekday_name")]
    pub day: Weekday,
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
}

/// A healthcare practitioner with a recurring weekly schedule.
///
/// Schedule order is the configuration's insertion order, not chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl Provider {
    /// Case-insensitive substring match on the provider name.
    pub fn matches(&self, filter: &str) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }
}

/// Read-only provider table, loaded once at startup and shared between sessions.
///
/// There is no write path after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDirectory {
    providers: Vec<Provider>,
}

impl ProviderDirectory {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Parse the provider configuration document (JSON array of provider records).
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let providers: Vec<Provider> = serde_json::from_str(raw)
            .map_err(|e| DomainError::Config(format!("invalid provider configuration: {}", e)))?;
        Ok(Self::new(providers))
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// A candidate appointment. Derived on every search, never stored by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub provider: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub day_of_week: String,
    pub formatted_date: String,
    pub formatted_time: String,
}

impl AppointmentSlot {
    pub fn new(provider: &str, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            provider: provider.to_string(),
            date,
            time,
            day_of_week: date.format("%A").to_string(),
            formatted_date: date.format("%B %d, %Y").to_string(),
            formatted_time: time.format("%I:%M %p").to_string(),
        }
    }

    /// "October 20, 2026 at 09:00 AM"
    pub fn when(&self) -> String {
        format!("{} at {}", self.formatted_date, self.formatted_time)
    }
}

/// Full English weekday names ("Monday") on the wire. Parsing is case-insensitive.
mod weekday_name {
    use super::*;

    pub fn serialize<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(full_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(d)?;
        raw.trim()
            .parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("unknown weekday '{}'", raw)))
    }

    fn full_name(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

mod hh_mm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("invalid start time '{}' (expected HH:MM): {}", raw, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_from_json() {
        let raw = r#"[
            {"name": "Dr. Ada Lane", "schedule": [
                {"day": "Monday", "start": "09:00"},
                {"day": "thursday", "start": "14:30"}
            ]},
            {"name": "Dr. Omar Reyes", "schedule": []}
        ]"#;
        let dir = ProviderDirectory::from_json(raw).unwrap();
        assert_eq!(dir.len(), 2);
        let ada = &dir.providers()[0];
        assert_eq!(ada.schedule[0].day, Weekday::Mon);
        assert_eq!(ada.schedule[1].day, Weekday::Thu);
        assert_eq!(
            ada.schedule[1].start,
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_directory_rejects_bad_day() {
        let raw = r#"[{"name": "X", "schedule": [{"day": "Funday", "start": "09:00"}]}]"#;
        let err = ProviderDirectory::from_json(raw).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
        assert!(err.to_string().contains("Funday"));
    }

    #[test]
    fn test_directory_rejects_bad_time() {
        let raw = r#"[{"name": "X", "schedule": [{"day": "Monday", "start": "9am"}]}]"#;
        assert!(ProviderDirectory::from_json(raw).is_err());
    }

    #[test]
    fn test_provider_matches_case_insensitive_substring() {
        let p = Provider {
            name: "Dr. Ada Lane".to_string(),
            schedule: vec![],
        };
        assert!(p.matches("lane"));
        assert!(p.matches("ADA"));
        assert!(!p.matches("reyes"));
    }

    #[test]
    fn test_slot_formatting_and_wire_shape() {
        let slot = AppointmentSlot::new(
            "Dr. Ada Lane",
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
        );
        assert_eq!(slot.day_of_week, "Tuesday");
        assert_eq!(slot.formatted_date, "October 20, 2026");
        assert_eq!(slot.formatted_time, "02:05 PM");

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["date"], "2026-10-20");
        assert_eq!(json["time"], "14:05");
    }
}
