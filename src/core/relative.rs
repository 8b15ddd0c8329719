// Feedline - core/relative.rs
//
// English "time ago" phrases for comment bylines ("3 hours ago", "in 2 days").
// Each unit is chosen by rounding, so 50 minutes reads "1 hour ago".

use crate::util::constants::{
    DAYS_PER_MONTH, DAYS_PER_YEAR, JUST_NOW_SECS, SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MINUTE,
};
use chrono::{DateTime, Utc};

fn phrase(amount: i64, unit: &str, future: bool) -> String {
    let plural = if amount == 1 { "" } else { "s" };
    if future {
        format!("in {amount} {unit}{plural}")
    } else {
        format!("{amount} {unit}{plural} ago")
    }
}

/// Describe `then` relative to `now`.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then).num_seconds();
    let future = delta < 0;
    let secs = delta.unsigned_abs() as f64;

    if secs < JUST_NOW_SECS as f64 {
        return "just now".to_string();
    }

    let minutes = (secs / SECS_PER_MINUTE).round() as i64;
    if minutes < 60 {
        return phrase(minutes.max(1), "minute", future);
    }

    let hours = (secs / SECS_PER_HOUR).round() as i64;
    if hours < 24 {
        return phrase(hours, "hour", future);
    }

    let days_exact = secs / SECS_PER_DAY;
    let days = days_exact.round() as i64;
    if days < 7 {
        return phrase(days, "day", future);
    }

    if days_exact < DAYS_PER_MONTH {
        return phrase((days_exact / 7.0).round() as i64, "week", future);
    }

    let months = (days_exact / DAYS_PER_MONTH).round() as i64;
    if months < 12 {
        return phrase(months, "month", future);
    }

    phrase(
        ((days_exact / DAYS_PER_YEAR).round() as i64).max(1),
        "year",
        future,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        format_relative(now() - d, now())
    }

    #[test]
    fn test_just_now() {
        assert_eq!(ago(Duration::seconds(0)), "just now");
        assert_eq!(ago(Duration::seconds(44)), "just now");
        assert_eq!(format_relative(now() + Duration::seconds(10), now()), "just now");
    }

    #[test]
    fn test_minutes_hours_days() {
        assert_eq!(ago(Duration::seconds(50)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::minutes(59) + Duration::seconds(40)), "1 hour ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
        assert_eq!(ago(Duration::hours(30)), "1 day ago");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
    }

    #[test]
    fn test_weeks_months_years() {
        assert_eq!(ago(Duration::days(7)), "1 week ago");
        assert_eq!(ago(Duration::days(20)), "3 weeks ago");
        assert_eq!(ago(Duration::days(45)), "1 month ago");
        assert_eq!(ago(Duration::days(200)), "7 months ago");
        assert_eq!(ago(Duration::days(400)), "1 year ago");
        assert_eq!(ago(Duration::days(1000)), "3 years ago");
    }

    #[test]
    fn test_future_times() {
        assert_eq!(format_relative(now() + Duration::hours(2), now()), "in 2 hours");
        assert_eq!(format_relative(now() + Duration::days(1), now()), "in 1 day");
    }
}
