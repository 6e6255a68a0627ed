use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Milliseconds since the epoch, as used for fallback ids and upload names.
pub fn unix_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Accepts a plain `YYYY-MM-DD` day or a full RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<Date> {
    let day = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(value, day) {
        return Some(date);
    }
    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .map(|timestamp| timestamp.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_days_and_timestamps() {
        assert_eq!(parse_date("2026-02-14"), Some(date!(2026 - 02 - 14)));
        assert_eq!(
            parse_date("2026-02-14T18:30:00Z"),
            Some(date!(2026 - 02 - 14))
        );
        assert_eq!(parse_date("14/02/2026"), None);
    }

    #[test]
    fn now_is_parseable() {
        assert!(parse_date(&now_rfc3339()).is_some());
    }
}
