use crate::domain::CoreError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Week-of-year convention used by weekly buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekNumbering {
    /// ISO-8601: weeks start Monday, week 01 holds the year's first Thursday,
    /// and the year is the ISO week-year (Dec 29..31 may belong to next year).
    #[default]
    Iso,
    /// strftime `%U`: weeks start Sunday, days before the first Sunday are week 00.
    Sunday,
    /// strftime `%W`: weeks start Monday, days before the first Monday are week 00.
    Monday,
}

impl WeekNumbering {
    /// `(year, week)` pair for a date under this convention.
    pub fn year_week<D: Datelike>(self, date: &D) -> (i32, u32) {
        match self {
            WeekNumbering::Iso => {
                let iso = date.iso_week();
                (iso.year(), iso.week())
            }
            WeekNumbering::Sunday => {
                let offset = date.weekday().num_days_from_sunday();
                (date.year(), (date.ordinal0() + 7 - offset) / 7)
            }
            WeekNumbering::Monday => {
                let offset = date.weekday().num_days_from_monday();
                (date.year(), (date.ordinal0() + 7 - offset) / 7)
            }
        }
    }

    /// First day of the week bucket containing `date`.
    ///
    /// Non-ISO buckets never cross Jan 1, so a week straddling the new year
    /// is split into a tail of the old year and week 00 of the new one.
    pub(crate) fn week_start(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            WeekNumbering::Iso | WeekNumbering::Monday => {
                let back = date.weekday().num_days_from_monday();
                let start = date.checked_sub_days(Days::new(u64::from(back)))?;
                Some(self.clamp_to_year(date, start))
            }
            WeekNumbering::Sunday => {
                let back = date.weekday().num_days_from_sunday();
                let start = date.checked_sub_days(Days::new(u64::from(back)))?;
                Some(self.clamp_to_year(date, start))
            }
        }
    }

    /// First day of the bucket following the one containing `date`.
    pub(crate) fn next_week_start(self, date: NaiveDate) -> Option<NaiveDate> {
        let back = match self {
            WeekNumbering::Iso | WeekNumbering::Monday => {
                date.weekday().num_days_from_monday()
            }
            WeekNumbering::Sunday => date.weekday().num_days_from_sunday(),
        };
        let next = date.checked_add_days(Days::new(u64::from(7 - back)))?;
        if self == WeekNumbering::Iso || next.year() == date.year() {
            return Some(next);
        }
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    }

    fn clamp_to_year(self, date: NaiveDate, start: NaiveDate) -> NaiveDate {
        if self == WeekNumbering::Iso || start.year() == date.year() {
            return start;
        }
        NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(start)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WeekNumbering::Iso => "iso",
            WeekNumbering::Sunday => "sunday",
            WeekNumbering::Monday => "monday",
        }
    }
}

impl FromStr for WeekNumbering {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iso" | "iso8601" | "iso-8601" => Ok(WeekNumbering::Iso),
            "sunday" | "us" | "%u" => Ok(WeekNumbering::Sunday),
            "monday" | "%w" => Ok(WeekNumbering::Monday),
            _ => Err(CoreError::UnknownWeekNumbering(s.to_string())),
        }
    }
}

impl fmt::Display for WeekNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
