// Date expressions for --now and similar reference-time flags

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use anyhow::Result;

fn local_ts(datetime: &NaiveDateTime) -> Result<i64> {
    let local_dt = Local
        .from_local_datetime(datetime)
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("Nonexistent local time: {}", datetime))?;
    Ok(local_dt.timestamp())
}

/// Parse a date expression and return a Unix timestamp (UTC).
///
/// Supported: `now`, `today`, `yesterday`, `tomorrow`, `2026-01-10`,
/// `2026-01-10T14:30`, RFC 3339, and raw Unix seconds.
pub fn parse_date_expr(expr: &str) -> Result<i64> {
    let expr = expr.trim();

    if !expr.is_empty() && expr.chars().all(|c| c.is_ascii_digit()) {
        return Ok(expr.parse::<i64>()?);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt.timestamp());
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        let datetime = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
        return local_ts(&datetime);
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M") {
        return local_ts(&datetime);
    }

    let now = Local::now();
    let midnight_offset = |days: i64| -> Result<i64> {
        let day = now.date_naive() + chrono::Duration::days(days);
        let datetime = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
        local_ts(&datetime)
    };
    match expr {
        "now" => Ok(now.timestamp()),
        "today" => midnight_offset(0),
        "yesterday" => midnight_offset(-1),
        "tomorrow" => midnight_offset(1),
        _ => anyhow::bail!(
            "Unsupported date expression: '{}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM, now, today or Unix seconds.",
            expr
        ),
    }
}

/// Format a Unix timestamp as a local `YYYY-MM-DD` date
pub fn format_date(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix_seconds() {
        assert_eq!(parse_date_expr("1760000000").unwrap(), 1_760_000_000);
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_date_expr("2025-10-09T08:53:20Z").unwrap(), 1_760_000_000);
    }

    #[test]
    fn test_parse_local_dates() {
        let day = parse_date_expr("2026-01-10").unwrap();
        let with_time = parse_date_expr("2026-01-10T14:30").unwrap();
        assert_eq!(with_time - day, 14 * 3600 + 30 * 60);
        assert_eq!(format_date(day), "2026-01-10");
    }

    #[test]
    fn test_parse_relative() {
        let today = parse_date_expr("today").unwrap();
        let tomorrow = parse_date_expr("tomorrow").unwrap();
        let now = parse_date_expr("now").unwrap();
        assert!(today <= now);
        assert!(tomorrow > now);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_expr("next week").is_err());
        assert!(parse_date_expr("").is_err());
    }
}
