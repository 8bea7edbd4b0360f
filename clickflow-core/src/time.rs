//! UTC calendar-day windows.
//!
//! Every "today vs. yesterday" comparison in the analyzers uses these
//! windows, so day boundaries are identical everywhere: midnight UTC to
//! one millisecond before the next midnight.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive UTC time range covering exactly one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Midnight UTC at the start of the day.
    pub start: DateTime<Utc>,
    /// `23:59:59.999` UTC of the same day.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The window covering `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        Self {
            start,
            end: start + Duration::days(1) - Duration::milliseconds(1),
        }
    }

    /// The window containing `instant`.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::for_date(instant.date_naive())
    }

    /// Today's window as of `now`.
    pub fn today(now: DateTime<Utc>) -> Self {
        Self::containing(now)
    }

    /// The window one day earlier.
    pub fn previous(&self) -> Self {
        Self::for_date(self.start.date_naive() - Duration::days(1))
    }

    /// The calendar date this window covers.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Today's and yesterday's windows, in that order.
pub fn last_two_days(now: DateTime<Utc>) -> (DayWindow, DayWindow) {
    let today = DayWindow::today(now);
    (today, today.previous())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_spans_whole_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let window = DayWindow::for_date(date);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2026, 3, 15, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn boundaries_are_inclusive() {
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + Duration::milliseconds(1)));
        assert!(!window.contains(window.start - Duration::milliseconds(1)));
    }

    #[test]
    fn previous_backs_up_one_calendar_day() {
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(
            window.previous().date(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }

    #[test]
    fn containing_uses_utc_date() {
        let late = Utc.with_ymd_and_hms(2026, 7, 4, 23, 59, 59).unwrap();
        let window = DayWindow::containing(late);
        assert_eq!(window.date(), NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
        assert!(window.contains(late));
    }

    #[test]
    fn last_two_days_are_adjacent() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let (today, yesterday) = last_two_days(now);
        assert_eq!(yesterday.end + Duration::milliseconds(1), today.start);
    }
}
