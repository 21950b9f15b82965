//! Wall-clock and calendar helpers.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Today's UTC calendar date as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Whole days between 1970-01-01 and the date at the start of `raw`.
///
/// Only the first ten characters are considered, so full timestamps such as
/// `2024-03-01T08:30:00Z` resolve to their calendar day. Anything that does
/// not parse yields 0.
pub fn day_index(raw: &str) -> i64 {
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, DATE_FORMAT)
        .map(|date| (date - NaiveDate::default()).num_days())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_and_known_dates() {
        assert_eq!(day_index("1970-01-01"), 0);
        assert_eq!(day_index("1970-01-02"), 1);
        assert_eq!(day_index("2024-01-01"), 19_723);
        assert_eq!(day_index("1969-12-31"), -1);
    }

    #[test]
    fn timestamps_use_their_calendar_day() {
        assert_eq!(day_index("2024-01-01T23:59:59Z"), 19_723);
    }

    #[test]
    fn unparsable_dates_are_zero() {
        assert_eq!(day_index(""), 0);
        assert_eq!(day_index("yesterday"), 0);
        assert_eq!(day_index("2024-13-01"), 0);
        assert_eq!(day_index("01/02/2024"), 0);
        assert_eq!(day_index("2024-0é-01"), 0);
    }

    #[test]
    fn today_round_trips_through_day_index() {
        let today = today_utc();
        assert_eq!(today.len(), 10);
        assert!(day_index(&today) > 19_000);
    }
}
