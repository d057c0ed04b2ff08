//! Frequency, calendar and conversion method definitions.
//!
//! These enums parameterize unified series requests and in-house uploads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Frequency of a time series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesFrequency {
    /// The highest frequency among the requested series.
    #[default]
    Highest,
    /// Annual.
    Annual,
    /// Semi-annual.
    SemiAnnual,
    /// Quarterly, full quarters only.
    QuarterlyFull,
    /// Quarterly.
    Quarterly,
    /// Every other month.
    BiMonthly,
    /// Monthly.
    Monthly,
    /// Weekly.
    Weekly,
    /// Daily.
    Daily,
    /// The lowest frequency among the requested series.
    Lowest,
}

impl SeriesFrequency {
    /// Name stored in the `Frequency` metadata attribute of an in-house series.
    ///
    /// `None` for the relative frequencies, which only make sense in a conversion.
    #[must_use]
    pub const fn metadata_name(&self) -> Option<&'static str> {
        match self {
            Self::Annual => Some("annual"),
            Self::SemiAnnual => Some("semiannual"),
            Self::QuarterlyFull => Some("quarterlyfull"),
            Self::Quarterly => Some("quarterly"),
            Self::BiMonthly => Some("bimonthly"),
            Self::Monthly => Some("monthly"),
            Self::Weekly => Some("weekly"),
            Self::Daily => Some("daily"),
            Self::Highest | Self::Lowest => None,
        }
    }
}

/// Days of the week a daily series has observations on.
///
/// Serialized as the numeric day mask, Sunday being bit 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SeriesWeekdays {
    /// Monday to Friday.
    #[default]
    MondayToFriday,
    /// Sunday to Thursday.
    SundayToThursday,
    /// Saturday to Thursday.
    SaturdayToThursday,
    /// All seven days.
    FullWeek,
}

impl SeriesWeekdays {
    /// The day mask value.
    #[must_use]
    pub const fn mask(&self) -> u8 {
        match self {
            Self::MondayToFriday => 62,
            Self::SundayToThursday => 31,
            Self::SaturdayToThursday => 95,
            Self::FullWeek => 127,
        }
    }

    /// Looks up a day mask value.
    #[must_use]
    pub const fn from_mask(mask: u8) -> Option<Self> {
        match mask {
            62 => Some(Self::MondayToFriday),
            31 => Some(Self::SundayToThursday),
            95 => Some(Self::SaturdayToThursday),
            127 => Some(Self::FullWeek),
            _ => None,
        }
    }
}

impl Serialize for SeriesWeekdays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.mask())
    }
}

impl<'de> Deserialize<'de> for SeriesWeekdays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mask = u8::deserialize(deserializer)?;
        Self::from_mask(mask)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown day mask {mask}")))
    }
}

/// How the calendars of several series are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalendarMergeMode {
    /// Start and end where any series has data.
    #[default]
    StartAndEndInAny,
    /// Only dates where all series have data.
    AvailableInAll,
    /// Dates where any series has data.
    AvailableInAny,
    /// Every date of the calendar.
    FullCalendar,
}

/// How missing observations are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesMissingValueMethod {
    /// Leave gaps.
    None,
    /// Chosen by the series' metadata.
    #[default]
    Auto,
    /// Repeat the previous value.
    Previous,
    /// Fill with zero.
    Zero,
    /// Interpolate linearly.
    Linear,
}

/// How a series is converted to a lower frequency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesToLowerFrequencyMethod {
    /// Chosen by the series' metadata.
    #[default]
    Auto,
    /// Last value of the period.
    Last,
    /// First value of the period.
    First,
    /// Sum over the period.
    Flow,
    /// Percentage change over the period.
    PercentageChange,
    /// Highest value of the period.
    Highest,
    /// Lowest value of the period.
    Lowest,
    /// Average over the period.
    Average,
}

/// How a series is converted to a higher frequency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesToHigherFrequencyMethod {
    /// Chosen by the series' metadata.
    #[default]
    Auto,
    /// Repeat the value in each sub-period.
    Same,
    /// Distribute the value evenly.
    Distribute,
    /// Interpolate linearly.
    Linear,
    /// Place the value in one sub-period.
    Pulse,
    /// Quadratic interpolation.
    Quadratic,
    /// Cubic interpolation.
    Cubic,
    /// Logarithmic interpolation.
    Logarithmic,
}

/// How incomplete periods at the end of a series are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesPartialPeriodsMethod {
    /// Drop partial periods.
    None,
    /// Chosen by the series' metadata.
    #[default]
    Auto,
    /// Convert partial periods with the lower-frequency method.
    ReduceToLower,
}
