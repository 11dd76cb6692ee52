//! Next-available appointment search over the provider directory.
//!
//! Scans forward one day at a time from tomorrow (offset +1) through +7 inclusive.
//! The first day on which any matching provider has a schedule entry wins; within
//! that day, directory order then schedule order decides. Times on the same day
//! are not compared against each other.

use chrono::{Datelike, Days, NaiveDate};

use super::{AppointmentSlot, Provider, ProviderDirectory};

/// Number of days scanned after today.
pub const LOOKAHEAD_DAYS: u64 = 7;

/// Earliest slot across the directory, optionally narrowed by a case-insensitive
/// substring of the provider name. An empty filter means no filter.
pub fn find_next_slot(
    directory: &ProviderDirectory,
    today: NaiveDate,
    provider_filter: Option<&str>,
) -> Option<AppointmentSlot> {
    let filter = provider_filter.filter(|f| !f.is_empty());
    let candidates: Vec<&Provider> = directory
        .providers()
        .iter()
        .filter(|p| filter.is_none_or(|f| p.matches(f)))
        .collect();
    scan(&candidates, today)
}

/// Earliest slot for exactly one provider.
pub fn find_next_slot_for(provider: &Provider, today: NaiveDate) -> Option<AppointmentSlot> {
    scan(&[provider], today)
}

fn scan(providers: &[&Provider], today: NaiveDate) -> Option<AppointmentSlot> {
    if providers.is_empty() {
        return None;
    }
    (1..=LOOKAHEAD_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .find_map(|date| {
            let weekday = date.weekday();
            providers.iter().find_map(|provider| {
                provider
                    .schedule
                    .iter()
                    .find(|entry| entry.day == weekday)
                    .map(|entry| AppointmentSlot::new(&provider.name, date, entry.start))
            })
        })
}
