//! Dates with optional month and day.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{EnmetError, Result};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A date known to the year, the month, or the day.
///
/// Release dates on the site come in all three precisions:
/// "February 19th, 1981", "September 1981" and "1981".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartialDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    /// Validated constructor. `month` is 1-based; a day requires a month.
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Result<Self> {
        let invalid = || EnmetError::InvalidDate(format!("{year}, {month:?}, {day:?}"));
        match (month, day) {
            (None, Some(_)) => return Err(invalid()),
            (Some(m), _) if !(1..=12).contains(&m) => return Err(invalid()),
            (Some(m), Some(d)) if d < 1 || d > days_in_month(year, m) => return Err(invalid()),
            _ => {}
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// 1-based month number for an English month name.
    pub fn month_from_name(name: &str) -> Option<u32> {
        MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| i as u32 + 1)
    }
}

fn is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let days = DAYS_IN_MONTH[month as usize - 1];
    if month == 2 && is_leap(year) { days + 1 } else { days }
}

impl FromStr for PartialDate {
    type Err = EnmetError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EnmetError::InvalidDate(s.to_string());
        let year = |part: &str| part.parse::<i32>().map_err(|_| invalid());
        let month = |part: &str| Self::month_from_name(part).ok_or_else(invalid);

        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [m, d, y] => {
                let day: String = d.chars().filter(char::is_ascii_digit).collect();
                let day = day.parse::<u32>().map_err(|_| invalid())?;
                Self::new(year(*y)?, Some(month(*m)?), Some(day))
            }
            [m, y] => Self::new(year(*y)?, Some(month(*m)?), None),
            [y] => Self::new(year(*y)?, None, None),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
        }
        if let Some(day) = self.day {
            write!(f, "-{day:02}")?;
        }
        Ok(())
    }
}

impl Serialize for PartialDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_precisions() {
        let full: PartialDate = "February 19th, 1981".parse().unwrap();
        assert_eq!((full.year(), full.month(), full.day()), (1981, Some(2), Some(19)));

        let month: PartialDate = "September 1981".parse().unwrap();
        assert_eq!((month.year(), month.month(), month.day()), (1981, Some(9), None));

        let year: PartialDate = "1981".parse().unwrap();
        assert_eq!((year.year(), year.month(), year.day()), (1981, None, None));
    }

    #[test]
    fn displays_iso_like() {
        assert_eq!("March 1st, 1984".parse::<PartialDate>().unwrap().to_string(), "1984-03-01");
        assert_eq!("March 1984".parse::<PartialDate>().unwrap().to_string(), "1984-03");
        assert_eq!("1984".parse::<PartialDate>().unwrap().to_string(), "1984");
    }

    #[test]
    fn leap_years() {
        assert!(PartialDate::new(2000, Some(2), Some(29)).is_ok());
        assert!(PartialDate::new(2004, Some(2), Some(29)).is_ok());
        assert!(PartialDate::new(1900, Some(2), Some(29)).is_err());
        assert!(PartialDate::new(2001, Some(2), Some(29)).is_err());
    }

    #[test]
    fn rejects_invalid() {
        assert!(PartialDate::new(1990, None, Some(3)).is_err());
        assert!(PartialDate::new(1990, Some(13), None).is_err());
        assert!(PartialDate::new(1990, Some(4), Some(31)).is_err());
        assert!(matches!(
            "Smarch 1990".parse::<PartialDate>(),
            Err(EnmetError::InvalidDate(_))
        ));
        assert!("".parse::<PartialDate>().is_err());
    }
}
