//! Date token resolution.
//!
//! Two token families show up in statement text:
//!   05/09/2024, 2024-09-05, 05-09-2024   full numeric dates
//!   05/SEP                              day + month abbreviation, no year
//!
//! The second family borrows a year inferred once per document.

use chrono::NaiveDate;

/// Month abbreviation table: `(ABBR, month number)`.
pub type MonthTable = &'static [(&'static str, u32)];

pub const SPANISH_MONTHS: MonthTable = &[
    ("ENE", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DIC", 12),
];

const NUMERIC_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Resolves date tokens for one document.
#[derive(Debug, Clone, Copy)]
pub struct DateResolver {
    year: i32,
    months: MonthTable,
}

impl DateResolver {
    pub fn new(year: i32, months: MonthTable) -> Self {
        Self { year, months }
    }

    /// Year used for tokens that carry none.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_number(&self, abbr: &str) -> Option<u32> {
        self.months
            .iter()
            .find(|(name, _)| *name == abbr)
            .map(|(_, m)| *m)
    }

    /// Resolve a single token. Impossible dates (30/FEB) give `None`.
    pub fn resolve(&self, token: &str) -> Option<NaiveDate> {
        let token = token.trim();
        if let Some(date) = self.resolve_abbreviated(token) {
            return Some(date);
        }
        NUMERIC_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
    }

    fn resolve_abbreviated(&self, token: &str) -> Option<NaiveDate> {
        // Example: "05/SEP"
        let (day, month) = token.split_once('/')?;
        if day.len() != 2 || month.len() != 3 {
            return None;
        }
        let day: u32 = day.parse().ok()?;
        let month = self.month_number(month)?;
        NaiveDate::from_ymd_opt(self.year, month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_abbreviated_uses_document_year() {
        let r = DateResolver::new(2024, SPANISH_MONTHS);
        assert_eq!(r.resolve("05/SEP"), Some(ymd(2024, 9, 5)));
        assert_eq!(r.resolve("31/DIC"), Some(ymd(2024, 12, 31)));
        assert_eq!(r.resolve("01/ENE"), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_numeric_formats() {
        let r = DateResolver::new(1999, SPANISH_MONTHS);
        assert_eq!(r.resolve("05/09/2024"), Some(ymd(2024, 9, 5)));
        assert_eq!(r.resolve("2024-09-05"), Some(ymd(2024, 9, 5)));
        assert_eq!(r.resolve("05-09-2024"), Some(ymd(2024, 9, 5)));
    }

    #[test]
    fn test_invalid_calendar_dates_are_unresolved() {
        let r = DateResolver::new(2023, SPANISH_MONTHS);
        assert_eq!(r.resolve("30/FEB"), None);
        assert_eq!(r.resolve("29/FEB"), None);
        assert_eq!(r.resolve("31/04/2024"), None);
        assert_eq!(DateResolver::new(2024, SPANISH_MONTHS).resolve("29/FEB"), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_unknown_month_and_garbage() {
        let r = DateResolver::new(2024, SPANISH_MONTHS);
        assert_eq!(r.resolve("05/SEPT"), None);
        assert_eq!(r.resolve("05/XYZ"), None);
        assert_eq!(r.resolve("05/sep"), None);
        assert_eq!(r.resolve("hello"), None);
        assert_eq!(r.resolve(""), None);
    }
}
