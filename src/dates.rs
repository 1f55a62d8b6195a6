use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Every current source reports Indian local time.
pub const INDIA: Tz = chrono_tz::Asia::Kolkata;

/// Day-month-year dates with dot, dash or slash separators ("01.01.2024",
/// "01-01-2024", "05/08/2024") at local midnight in `zone`.
pub fn day_month_year_epoch_ms(text: &str, zone: Tz) -> Option<i64> {
    let cleaned = text.trim().replace(['-', '/'], ".");
    let date = NaiveDate::parse_from_str(&cleaned, "%d.%m.%Y").ok()?;
    local_epoch_ms(date.and_time(NaiveTime::MIN), zone)
}

/// Month-name dates like "Feb 08, 2023" at local midnight in `zone`.
pub fn month_name_date_epoch_ms(text: &str, zone: Tz) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text.trim(), "%b %d, %Y").ok()?;
    local_epoch_ms(date.and_time(NaiveTime::MIN), zone)
}

/// Session timestamps like "Aug 05 2024 05:30PM" in `zone`.
pub fn session_stamp_epoch_ms(text: &str, zone: Tz) -> Option<i64> {
    let cleaned = text.trim().to_uppercase();
    let value = NaiveDateTime::parse_from_str(&cleaned, "%b %d %Y %I:%M%p").ok()?;
    local_epoch_ms(value, zone)
}

fn local_epoch_ms(value: NaiveDateTime, zone: Tz) -> Option<i64> {
    let localized = zone
        .from_local_datetime(&value)
        .earliest()
        .or_else(|| zone.from_local_datetime(&value).latest())?;
    Some(localized.timestamp_millis())
}
