use super::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How finely log buckets are sliced over time, coarsest first.
///
/// The integer codes are what configuration files persist. They must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RotationGranularity {
    /// `yyyy_MM`
    Monthly = 0,
    /// `yyyy_ww`
    Weekly = 1,
    /// `yyyy_MM_dd`
    DailyInMonth = 2,
    /// `yyyy_MM_dd_HH`
    HourlyInDay = 3,
}

impl RotationGranularity {
    pub const ALL: [RotationGranularity; 4] = [
        RotationGranularity::Monthly,
        RotationGranularity::Weekly,
        RotationGranularity::DailyInMonth,
        RotationGranularity::HourlyInDay,
    ];

    pub fn from_code(code: i64) -> Result<Self, CoreError> {
        match code {
            0 => Ok(RotationGranularity::Monthly),
            1 => Ok(RotationGranularity::Weekly),
            2 => Ok(RotationGranularity::DailyInMonth),
            3 => Ok(RotationGranularity::HourlyInDay),
            _ => Err(CoreError::InvalidPolicy(code)),
        }
    }

    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Number of `-` separated fields in a key of this cadence.
    pub const fn key_fields(self) -> usize {
        match self {
            RotationGranularity::Monthly | RotationGranularity::Weekly => 2,
            RotationGranularity::DailyInMonth => 3,
            RotationGranularity::HourlyInDay => 4,
        }
    }

    /// Persisted tag name, e.g. `yyyy_MM_dd`.
    pub const fn tag(self) -> &'static str {
        match self {
            RotationGranularity::Monthly => "yyyy_MM",
            RotationGranularity::Weekly => "yyyy_ww",
            RotationGranularity::DailyInMonth => "yyyy_MM_dd",
            RotationGranularity::HourlyInDay => "yyyy_MM_dd_HH",
        }
    }
}

impl TryFrom<i64> for RotationGranularity {
    type Error = CoreError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        RotationGranularity::from_code(code)
    }
}

impl FromStr for RotationGranularity {
    type Err = CoreError;

    /// Accepts the persisted tag (case-sensitive, `MM` is not `mm`), a
    /// lower-case alias, or the integer code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return RotationGranularity::from_code(code);
        }
        if let Some(granularity) = RotationGranularity::ALL
            .into_iter()
            .find(|g| g.tag() == trimmed)
        {
            return Ok(granularity);
        }
        match trimmed.to_lowercase().as_str() {
            "monthly" | "month" => Ok(RotationGranularity::Monthly),
            "weekly" | "week" => Ok(RotationGranularity::Weekly),
            "daily" | "day" => Ok(RotationGranularity::DailyInMonth),
            "hourly" | "hour" => Ok(RotationGranularity::HourlyInDay),
            _ => Err(CoreError::UnknownPolicyName(s.to_string())),
        }
    }
}

impl fmt::Display for RotationGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for RotationGranularity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GranularityRepr {
    Code(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for RotationGranularity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match GranularityRepr::deserialize(deserializer)? {
            GranularityRepr::Code(code) => RotationGranularity::from_code(code),
            GranularityRepr::Name(name) => name.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(RotationGranularity::Monthly.code(), 0);
        assert_eq!(RotationGranularity::Weekly.code(), 1);
        assert_eq!(RotationGranularity::DailyInMonth.code(), 2);
        assert_eq!(RotationGranularity::HourlyInDay.code(), 3);
    }

    #[test]
    fn test_ordered_coarsest_to_finest() {
        assert!(RotationGranularity::Monthly < RotationGranularity::Weekly);
        assert!(RotationGranularity::Weekly < RotationGranularity::DailyInMonth);
        assert!(RotationGranularity::DailyInMonth < RotationGranularity::HourlyInDay);
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert_eq!(
            RotationGranularity::from_code(4),
            Err(CoreError::InvalidPolicy(4))
        );
        assert_eq!(
            RotationGranularity::from_code(-3),
            Err(CoreError::InvalidPolicy(-3))
        );
    }

    #[test]
    fn test_from_str_tags_aliases_and_codes() {
        assert_eq!(
            "yyyy_MM".parse::<RotationGranularity>().unwrap(),
            RotationGranularity::Monthly
        );
        assert_eq!(
            "yyyy_MM_dd_HH".parse::<RotationGranularity>().unwrap(),
            RotationGranularity::HourlyInDay
        );
        assert_eq!(
            "Weekly".parse::<RotationGranularity>().unwrap(),
            RotationGranularity::Weekly
        );
        assert_eq!(
            "2".parse::<RotationGranularity>().unwrap(),
            RotationGranularity::DailyInMonth
        );
        assert_eq!(
            "yearly".parse::<RotationGranularity>(),
            Err(CoreError::UnknownPolicyName("yearly".into()))
        );
        assert_eq!(
            "7".parse::<RotationGranularity>(),
            Err(CoreError::InvalidPolicy(7))
        );
    }

    #[test]
    fn test_serializes_as_integer_code() {
        let json = serde_json::to_string(&RotationGranularity::DailyInMonth).unwrap();
        assert_eq!(json, "2");

        let parsed: RotationGranularity = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, RotationGranularity::HourlyInDay);

        let parsed: RotationGranularity = serde_json::from_str("\"yyyy_ww\"").unwrap();
        assert_eq!(parsed, RotationGranularity::Weekly);

        assert!(serde_json::from_str::<RotationGranularity>("9").is_err());
    }
}
