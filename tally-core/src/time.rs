//! Time utilities: timezone-aware "today" for statement year fallback.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name like "America/Mexico_City".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Local calendar date of `now` in the given timezone.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Calendar year "right now" in the given IANA timezone.
///
/// Used when a statement carries no period header to infer its year from.
pub fn current_year(tz: &str) -> Result<i32> {
    let tz = parse_timezone(tz)?;
    Ok(local_date(Utc::now(), tz).year())
}
