use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
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

/// A calendar month. `month` is 1-based and always in `1..=12`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month must be between 1 and 12, got {month}");
        }
        if !(NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year) {
            bail!("The year {year} is outside the supported calendar");
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing the local date of the system clock.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Moves forward (positive `delta`) or backward by whole months, rolling the year over. The
    /// result stops at the first or last month that has a calendar date.
    pub fn shift(&self, delta: i32) -> Self {
        let first = i64::from(NaiveDate::MIN.year()) * 12;
        let last = i64::from(NaiveDate::MAX.year()) * 12 + 11;
        let index = (i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(delta))
            .clamp(first, last);
        Self {
            year: i32::try_from(index.div_euclid(12)).unwrap_or(self.year),
            month: u32::try_from(index.rem_euclid(12)).unwrap_or(0) + 1,
        }
    }

    /// Returns true if `date` falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The long form used in headings, e.g. `August 2025`.
    pub fn long_name(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl Default for YearMonth {
    fn default() -> Self {
        Self::current()
    }
}

/// Formats as `YYYY-MM`.
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .with_context(|| format!("Month must be in the format YYYY-MM, got '{s}'"))?;
        let year = year
            .parse::<i32>()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month = month
            .parse::<u32>()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        YearMonth::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        YearMonth::from_str(&s).map_err(serde::de::Error::custom)
    }
}
