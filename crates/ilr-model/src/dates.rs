//! Date helpers shared by rules and error parameters.

use chrono::{Datelike, NaiveDate};

/// Canonical textual form for dates in error parameters.
///
/// Downstream message templates match on this exact layout.
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date in the canonical `dd/MM/yyyy` layout.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Whole years between `from` and `to`, counting a year only once its
/// anniversary has been reached. Negative when `to` precedes `from`.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -years_between(to, from);
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Age in whole years on `date` for someone born on `date_of_birth`.
pub fn age_at(date_of_birth: NaiveDate, date: NaiveDate) -> i32 {
    years_between(date_of_birth, date)
}

/// Add whole years to a date, clamping 29 February to 28 February.
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn formats_day_month_year() {
        assert_eq!(format_date(d(2019, 8, 1)), "01/08/2019");
    }

    #[test]
    fn age_respects_birthday() {
        assert_eq!(age_at(d(2003, 9, 1), d(2019, 8, 31)), 15);
        assert_eq!(age_at(d(2003, 9, 1), d(2019, 9, 1)), 16);
        assert_eq!(age_at(d(2003, 9, 1), d(2003, 9, 1)), 0);
    }

    #[test]
    fn years_between_is_antisymmetric() {
        assert_eq!(years_between(d(2020, 1, 1), d(2018, 1, 1)), -2);
    }

    #[test]
    fn add_years_clamps_leap_day() {
        assert_eq!(add_years(d(2020, 2, 29), 1), d(2021, 2, 28));
        assert_eq!(add_years(d(2019, 7, 31), 1), d(2020, 7, 31));
    }
}
