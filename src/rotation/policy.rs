use super::week::WeekNumbering;
use crate::domain::{BucketKey, CoreError, RotationGranularity};
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

/// Resolves instants to bucket keys for one configured cadence.
///
/// Keys are `YYYY-MM`, `YYYY-WW`, `YYYY-MM-DD` or `YYYY-MM-DD-HH`, fixed width
/// and zero padded, so for years 0..=9999 string order is time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    pub granularity: RotationGranularity,
    #[serde(default)]
    pub week_numbering: WeekNumbering,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(RotationGranularity::DailyInMonth)
    }
}

impl RotationPolicy {
    pub const fn new(granularity: RotationGranularity) -> Self {
        Self {
            granularity,
            week_numbering: WeekNumbering::Iso,
        }
    }

    pub const fn with_week_numbering(mut self, week_numbering: WeekNumbering) -> Self {
        self.week_numbering = week_numbering;
        self
    }

    /// Build from a persisted integer code; unknown codes are `InvalidPolicy`.
    pub fn from_code(code: i64) -> Result<Self, CoreError> {
        RotationGranularity::from_code(code).map(Self::new)
    }

    /// Key of the bucket `instant` falls in.
    ///
    /// Only years 0..=9999 produce the fixed-width shape; later years get a
    /// five digit prefix that sorts before `9999-...`, and `matches_key`
    /// rejects them.
    pub fn bucket_key<T>(&self, instant: &T) -> BucketKey
    where
        T: Datelike + Timelike,
    {
        let key = match self.granularity {
            RotationGranularity::Monthly => {
                format!("{:04}-{:02}", instant.year(), instant.month())
            }
            RotationGranularity::Weekly => {
                let (year, week) = self.week_numbering.year_week(instant);
                format!("{year:04}-{week:02}")
            }
            RotationGranularity::DailyInMonth => format!(
                "{:04}-{:02}-{:02}",
                instant.year(),
                instant.month(),
                instant.day()
            ),
            RotationGranularity::HourlyInDay => format!(
                "{:04}-{:02}-{:02}-{:02}",
                instant.year(),
                instant.month(),
                instant.day(),
                instant.hour()
            ),
        };
        BucketKey::new(key)
    }

    /// True iff `instant` falls in a different bucket than `previous`.
    pub fn has_rotated<T>(&self, previous: &str, instant: &T) -> bool
    where
        T: Datelike + Timelike,
    {
        self.bucket_key(instant) != previous
    }

    /// True iff `key` has the fixed-width shape this cadence produces:
    /// a four digit year followed by two digit fields.
    pub fn matches_key(&self, key: &str) -> bool {
        let mut fields = 0;
        for (i, field) in key.split('-').enumerate() {
            let width = if i == 0 { 4 } else { 2 };
            if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            fields += 1;
        }
        fields == self.granularity.key_fields()
    }

    /// First instant of the bucket containing `instant`.
    ///
    /// `None` only at the edge of chrono's representable range.
    pub fn bucket_start(&self, instant: &NaiveDateTime) -> Option<NaiveDateTime> {
        let date = instant.date();
        let start = match self.granularity {
            RotationGranularity::Monthly => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_time(NaiveTime::MIN)
            }
            RotationGranularity::Weekly => {
                self.week_numbering.week_start(date)?.and_time(NaiveTime::MIN)
            }
            RotationGranularity::DailyInMonth => date.and_time(NaiveTime::MIN),
            RotationGranularity::HourlyInDay => date.and_hms_opt(instant.hour(), 0, 0)?,
        };
        Some(start)
    }

    /// First instant of the bucket after the one containing `instant`; the
    /// bucket key changes exactly here.
    pub fn next_boundary(&self, instant: &NaiveDateTime) -> Option<NaiveDateTime> {
        let date = instant.date();
        let next = match self.granularity {
            RotationGranularity::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
                .checked_add_months(Months::new(1))?
                .and_time(NaiveTime::MIN),
            RotationGranularity::Weekly => self
                .week_numbering
                .next_week_start(date)?
                .and_time(NaiveTime::MIN),
            RotationGranularity::DailyInMonth => date
                .checked_add_days(Days::new(1))?
                .and_time(NaiveTime::MIN),
            RotationGranularity::HourlyInDay => self
                .bucket_start(instant)?
                .checked_add_signed(TimeDelta::hours(1))?,
        };
        Some(next)
    }
}

/// `bucket_key` with ISO week numbering.
pub fn bucket_key<T>(instant: &T, granularity: RotationGranularity) -> BucketKey
where
    T: Datelike + Timelike,
{
    RotationPolicy::new(granularity).bucket_key(instant)
}

/// `has_rotated` with ISO week numbering.
pub fn has_rotated<T>(previous: &str, instant: &T, granularity: RotationGranularity) -> bool
where
    T: Datelike + Timelike,
{
    RotationPolicy::new(granularity).has_rotated(previous, instant)
}

/// `bucket_key` for an unvalidated granularity code.
pub fn bucket_key_for_code<T>(instant: &T, code: i64) -> Result<BucketKey, CoreError>
where
    T: Datelike + Timelike,
{
    RotationPolicy::from_code(code).map(|policy| policy.bucket_key(instant))
}
