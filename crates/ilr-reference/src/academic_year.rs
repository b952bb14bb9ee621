//! Academic year boundaries.

use chrono::{Datelike, NaiveDate};

use crate::error::ReferenceError;
use crate::gateways::AcademicYearQuery;

/// An academic year running 1 August to 31 July.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcademicYear {
    start_year: i32,
}

impl AcademicYear {
    /// The academic year beginning 1 August of `start_year`.
    pub fn starting(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Parse a four-digit ILR year code such as `1920` (2019/20).
    pub fn parse(code: &str) -> Result<Self, ReferenceError> {
        let invalid = || ReferenceError::InvalidAcademicYear {
            value: code.to_string(),
        };
        let trimmed = code.trim();
        if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let first: i32 = trimmed[..2].parse().map_err(|_| invalid())?;
        let second: i32 = trimmed[2..].parse().map_err(|_| invalid())?;
        if (first + 1) % 100 != second {
            return Err(invalid());
        }
        Ok(Self::starting(2000 + first))
    }

    /// The academic year containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 8 {
            Self::starting(date.year())
        } else {
            Self::starting(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// The four-digit code, e.g. `1920`.
    pub fn code(&self) -> String {
        format!(
            "{:02}{:02}",
            self.start_year.rem_euclid(100),
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // 1 Aug, 31 Aug and 31 Jul exist in every year.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl AcademicYearQuery for AcademicYear {
    fn start(&self) -> NaiveDate {
        ymd(self.start_year, 8, 1)
    }

    fn end(&self) -> NaiveDate {
        ymd(self.start_year + 1, 7, 31)
    }

    fn august_thirty_first(&self) -> NaiveDate {
        ymd(self.start_year, 8, 31)
    }

    fn academic_year_start_for(&self, date: NaiveDate) -> NaiveDate {
        AcademicYear::containing(date).start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_year_code() {
        let year = AcademicYear::parse("1920").unwrap();
        assert_eq!(year.start(), d(2019, 8, 1));
        assert_eq!(year.end(), d(2020, 7, 31));
        assert_eq!(year.august_thirty_first(), d(2019, 8, 31));
        assert_eq!(year.code(), "1920");
    }

    #[test]
    fn rejects_non_consecutive_code() {
        assert!(AcademicYear::parse("1921").is_err());
        assert!(AcademicYear::parse("19x0").is_err());
        assert!(AcademicYear::parse("201920").is_err());
    }

    #[test]
    fn previous_year_boundaries() {
        let year = AcademicYear::starting(2019);
        assert!(year.date_is_in_previous_academic_year(d(2018, 8, 1)));
        assert!(year.date_is_in_previous_academic_year(d(2019, 7, 31)));
        assert!(!year.date_is_in_previous_academic_year(d(2019, 8, 1)));
        assert!(!year.date_is_in_previous_academic_year(d(2018, 7, 31)));
    }

    #[test]
    fn start_for_date_rolls_back_to_august() {
        let year = AcademicYear::starting(2019);
        assert_eq!(year.academic_year_start_for(d(2021, 3, 4)), d(2020, 8, 1));
        assert_eq!(year.academic_year_start_for(d(2021, 8, 1)), d(2021, 8, 1));
        assert!(year.is_in_current_academic_year(d(2020, 7, 31)));
    }
}
