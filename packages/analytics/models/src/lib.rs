#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived statistic types produced by the analytics engine.
//!
//! Every type here is a plain value computed from a
//! [`CityDataset`](lunar_crime_lunar_models::CityDataset) snapshot. Nothing
//! is persisted; the display layer serializes these to JSON as-is.

use lunar_crime_lunar_models::{CityId, DayOfWeek, MoonPhase};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Mean incident count over one subset of daily records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    /// Arithmetic mean of `count` over the subset.
    pub average: f64,
    /// Number of records in the subset.
    pub sample_size: u64,
}

/// The two sides of a predicate split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStats {
    /// Records for which the predicate held (e.g. full-moon days).
    pub matched: GroupStats,
    /// Records for which it did not.
    pub unmatched: GroupStats,
}

/// Relative difference between a treatment (full-moon) and baseline
/// (non-full-moon) average.
///
/// A positive `percent_difference` means the rate is elevated on full-moon
/// days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSize {
    /// `(treatment - baseline) / baseline * 100`.
    pub percent_difference: f64,
    /// `treatment / baseline`.
    pub normalized_ratio: f64,
}

/// Calendar month identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Aggregate for one calendar month of a city's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// Which month this bucket covers.
    pub month_key: MonthKey,
    /// Mean daily count over every observed day in the month.
    pub average: f64,
    /// Mean daily count over full-moon days. `0.0` when
    /// `has_full_moon_data` is `false`.
    pub full_moon_average: f64,
    /// Whether any full-moon day was observed in the month.
    pub has_full_moon_data: bool,
    /// Number of observed full-moon days.
    pub full_moon_day_count: u64,
    /// Number of observed days.
    pub total_days: u64,
    /// Observed distinct days divided by the calendar length of the month.
    pub completeness: f64,
    /// Full-moon vs. non-full-moon percent difference within the month, or
    /// `None` when either side is empty or the baseline is zero.
    pub full_moon_change_percent: Option<f64>,
}

/// Aggregate for one weekday across a city's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBucket {
    /// Sunday-first index, 0-6.
    pub weekday: u8,
    /// Weekday name.
    pub day: DayOfWeek,
    /// Mean daily count. `0.0` when `total_days` is zero.
    pub average: f64,
    /// Mean count over full-moon days. `0.0` when `has_full_moon_data` is
    /// `false`.
    pub full_moon_average: f64,
    /// Whether any full-moon day fell on this weekday.
    pub has_full_moon_data: bool,
    /// Number of full-moon days on this weekday.
    pub full_moon_day_count: u64,
    /// Number of observed days on this weekday (the sample size).
    pub total_days: u64,
    /// Full-moon vs. non-full-moon percent difference, or `None` when
    /// either side is empty or the baseline is zero.
    pub full_moon_change_percent: Option<f64>,
}

/// Modeled incident rates for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourProfile {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Modeled rate on ordinary days.
    pub baseline_rate: f64,
    /// Modeled rate on full-moon days.
    pub full_moon_rate: f64,
}

/// A 24-hour illustrative curve.
///
/// No per-hour data exists upstream: these values are generated from the
/// city-wide daily mean and a fixed seeded function, and are not
/// observations. `synthetic` is always `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticHourlyProfile {
    /// Always `true`.
    pub synthetic: bool,
    /// Human-readable provenance note for display alongside the curve.
    pub note: String,
    /// City-wide mean daily count the curve was scaled from.
    pub city_mean_daily_count: f64,
    /// One entry per hour, 0 through 23.
    pub hours: Vec<HourProfile>,
}

/// Mean daily count for one named phase category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBucket {
    /// Phase category.
    pub phase: MoonPhase,
    /// Mean count. `0.0` when `total_days` is zero.
    pub average: f64,
    /// Number of days classified into this phase.
    pub total_days: u64,
}

/// Binary significance label for a p-value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Significance {
    /// p-value below the threshold.
    Significant,
    /// p-value at or above the threshold.
    NotSignificant,
}

impl Significance {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Significant => "statistically significant",
            Self::NotSignificant => "not significant",
        }
    }

    /// Returns `true` for [`Self::Significant`].
    #[must_use]
    pub const fn is_significant(self) -> bool {
        matches!(self, Self::Significant)
    }
}

/// Descriptive band for the magnitude of a correlation coefficient.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationStrength {
    /// `|r| < 0.1`
    Weak,
    /// `0.1 <= |r| < 0.3`
    Moderate,
    /// `|r| >= 0.3`
    Strong,
}

/// Headline statistics for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStatistics {
    /// Which city.
    pub city: CityId,
    /// Sum of all daily counts.
    pub total_incidents: u64,
    /// Number of observed days.
    pub total_days: u64,
    /// Full-moon days (treatment group).
    pub full_moon: GroupStats,
    /// Every other day (baseline group).
    pub non_full_moon: GroupStats,
    /// Full-moon effect relative to the baseline.
    pub effect_size: EffectSize,
    /// p-value as supplied by the dataset.
    pub p_value: f64,
    /// Significance label for `p_value`.
    pub significance: Significance,
    /// Correlation as supplied by the dataset.
    pub correlation: f64,
    /// Magnitude band for `correlation`.
    pub correlation_strength: CorrelationStrength,
}

/// Figures for a city that do not depend on the full-moon split.
///
/// Always available for a loaded dataset, so the population and
/// significance parts of the comparison cover every city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    /// Which city.
    pub city: CityId,
    /// Sum of all daily counts.
    pub total_incidents: u64,
    /// Number of observed days.
    pub total_days: u64,
    /// p-value as supplied by the dataset.
    pub p_value: f64,
    /// Significance label for `p_value`.
    pub significance: Significance,
    /// Correlation as supplied by the dataset.
    pub correlation: f64,
    /// Magnitude band for `correlation`.
    pub correlation_strength: CorrelationStrength,
}

impl CityStatistics {
    /// The split-independent part of these statistics.
    #[must_use]
    pub const fn summary(&self) -> CitySummary {
        CitySummary {
            city: self.city,
            total_incidents: self.total_incidents,
            total_days: self.total_days,
            p_value: self.p_value,
            significance: self.significance,
            correlation: self.correlation,
            correlation_strength: self.correlation_strength,
        }
    }
}

/// Comparative summary across every loaded city.
///
/// Population and significance figures cover all of `cities`. The
/// effect-size figures cover only the cities that have a full-moon effect;
/// the rest are listed in `missing_effect_cities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCityComparison {
    /// Cities that took part, in input order.
    pub cities: Vec<CityId>,
    /// `max(total_incidents) / min(total_incidents)`.
    pub population_factor: f64,
    /// Largest normalized ratio among the cities with an effect size.
    /// `None` when no city has one.
    pub max_normalized_ratio: Option<f64>,
    /// City with the largest normalized ratio.
    pub max_ratio_city: Option<CityId>,
    /// Largest pairwise absolute gap between percent differences.
    pub effect_consistency: f64,
    /// `100` when every city is significant, otherwise `33.33` per
    /// significant city.
    pub combined_significance: f64,
    /// Cities whose p-value passed the threshold.
    pub significant_cities: Vec<CityId>,
    /// Cities left out of the effect-size figures because their full-moon
    /// effect could not be computed.
    pub missing_effect_cities: Vec<CityId>,
}

/// Category of a failed computation, serializable for display.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A required subset had no members.
    EmptyPartition,
    /// Division by a zero baseline.
    DegenerateBaseline,
    /// Moon phase outside `[0, 1)`.
    InvalidPhaseValue,
    /// Unparseable or duplicate date.
    InvalidDateRange,
    /// Correlation or p-value out of range.
    InvalidStatistic,
    /// Not enough cities to compare.
    InsufficientCities,
    /// City missing from the snapshot.
    UnknownCity,
}

/// Outcome of a derived statistic that may be unavailable for the data at
/// hand. Consumers render `Unavailable` as "insufficient data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum Computed<T> {
    /// The value was computed.
    Ready(T),
    /// The value could not be computed.
    Unavailable {
        /// What kind of failure occurred.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl<T> Computed<T> {
    /// Returns the value if it was computed.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Returns `true` if the value was computed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the failure kind, if any.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { kind, .. } => Some(*kind),
        }
    }
}

/// Every derived value for one city, with each fallible section isolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityReport {
    /// Which city.
    pub city: CityId,
    /// Fingerprint of the dataset the report was computed from.
    pub fingerprint: String,
    /// Totals and significance, available even when `statistics` is not.
    pub summary: CitySummary,
    /// Headline statistics.
    pub statistics: Computed<CityStatistics>,
    /// Monthly buckets in ascending month order.
    pub monthly: Computed<Vec<MonthBucket>>,
    /// Seven weekday buckets, Sunday first.
    pub weekday: Computed<Vec<WeekdayBucket>>,
    /// Modeled hourly curve.
    pub hourly: Computed<SyntheticHourlyProfile>,
    /// Eight phase buckets in cycle order.
    pub phases: Computed<Vec<PhaseBucket>>,
}
