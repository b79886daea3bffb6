#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input data model for the lunar crime analytics engine.
//!
//! Defines the city identifiers, the eight-way lunar phase taxonomy, the
//! Sunday-first weekday ordering, and the per-day incident records that
//! every derived statistic is computed from. Two flavors of the dataset
//! exist: the `Raw*` types mirror the loader's JSON document verbatim
//! (dates as strings, nothing checked), while [`CityDataset`] and
//! [`Snapshot`] hold records whose invariants have been validated.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the three cities covered by the dataset.
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
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CityId {
    /// Chicago, IL
    Chicago,
    /// New York City, NY
    Nyc,
    /// Los Angeles, CA
    La,
}

impl CityId {
    /// Returns the human-readable city name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Chicago => "Chicago",
            Self::Nyc => "New York City",
            Self::La => "Los Angeles",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Chicago, Self::Nyc, Self::La]
    }
}

/// Named lunar phase categories, ordered through the cycle starting at the
/// new moon.
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
pub enum MoonPhase {
    /// `[0.0, 0.125)`
    NewMoon,
    /// `[0.125, 0.25)`
    WaxingCrescent,
    /// `[0.25, 0.375)`
    FirstQuarter,
    /// `[0.375, 0.625)`
    WaxingGibbous,
    /// `[0.625, 0.75)`
    FullMoon,
    /// `[0.75, 0.875)`
    WaningGibbous,
    /// `[0.875, 0.95)`
    LastQuarter,
    /// `[0.95, 1.0)`
    WaningCrescent,
}

/// Lower (inclusive) bound of each phase band, in cycle order. Each band
/// ends where the next one starts; the last ends at `1.0` (exclusive).
///
/// The Waxing Gibbous band is twice as wide as its neighbors and Last
/// Quarter is narrower. This is the published table and is kept as-is.
pub const PHASE_BANDS: [(f64, MoonPhase); 8] = [
    (0.0, MoonPhase::NewMoon),
    (0.125, MoonPhase::WaxingCrescent),
    (0.25, MoonPhase::FirstQuarter),
    (0.375, MoonPhase::WaxingGibbous),
    (0.625, MoonPhase::FullMoon),
    (0.75, MoonPhase::WaningGibbous),
    (0.875, MoonPhase::LastQuarter),
    (0.95, MoonPhase::WaningCrescent),
];

impl MoonPhase {
    /// Classifies a fraction of the lunar cycle into its named phase.
    ///
    /// # Errors
    ///
    /// Returns an error if `fraction` is not in `[0, 1)` (including NaN).
    pub fn from_fraction(fraction: f64) -> Result<Self, InvalidPhaseError> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(InvalidPhaseError { value: fraction });
        }

        Ok(PHASE_BANDS
            .iter()
            .rev()
            .find(|(lower, _)| fraction >= *lower)
            .map_or(Self::NewMoon, |(_, phase)| *phase))
    }

    /// Returns the `[lower, upper)` fraction range covered by this phase.
    #[must_use]
    pub fn band(self) -> (f64, f64) {
        let idx = self.index();
        let lower = PHASE_BANDS[idx].0;
        let upper = PHASE_BANDS.get(idx + 1).map_or(1.0, |(next, _)| *next);
        (lower, upper)
    }

    /// Returns the zero-based position of this phase in the cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NewMoon,
            Self::WaxingCrescent,
            Self::FirstQuarter,
            Self::WaxingGibbous,
            Self::FullMoon,
            Self::WaningGibbous,
            Self::LastQuarter,
            Self::WaningCrescent,
        ]
    }
}

/// Error returned when a moon-phase fraction falls outside `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPhaseError {
    /// The out-of-range fraction that was provided.
    pub value: f64,
}

impl std::fmt::Display for InvalidPhaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid moon phase {}: expected [0, 1)", self.value)
    }
}

impl std::error::Error for InvalidPhaseError {}

/// Day of the week, numbered Sunday-first (Sunday = 0 … Saturday = 6).
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
pub enum DayOfWeek {
    /// 0
    Sunday,
    /// 1
    Monday,
    /// 2
    Tuesday,
    /// 3
    Wednesday,
    /// 4
    Thursday,
    /// 5
    Friday,
    /// 6
    Saturday,
}

impl DayOfWeek {
    /// Returns the Sunday-first index (0-6).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the day a calendar date falls on.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }

    /// Returns all variants of this enum, Sunday first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Sunday,
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
        ]
    }
}

/// One calendar day of incident data for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Calendar date. Unique within a city's series.
    pub date: NaiveDate,
    /// Number of incidents recorded on this day.
    pub count: u64,
    /// Fraction of the lunar cycle elapsed, in `[0, 1)` (0 = new moon).
    #[serde(alias = "moon_phase")]
    pub moon_phase: f64,
    /// Whether the upstream classifier placed this day in the full-moon
    /// window.
    #[serde(alias = "is_full_moon")]
    pub is_full_moon: bool,
}

/// A validated city dataset: correlation/p-value summary plus daily records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDataset {
    /// Correlation between moon phase and daily count, in `[-1, 1]`.
    pub correlation: f64,
    /// p-value of the correlation, `>= 0`.
    #[serde(alias = "p_value")]
    pub p_value: f64,
    /// Daily records. Order is irrelevant.
    #[serde(alias = "daily_data")]
    pub daily_data: Vec<DailyRecord>,
}

impl CityDataset {
    /// Sum of incident counts across every record, saturating at
    /// `u64::MAX`.
    #[must_use]
    pub fn total_incidents(&self) -> u64 {
        self.daily_data
            .iter()
            .fold(0u64, |total, r| total.saturating_add(r.count))
    }
}

/// A daily record exactly as the loader produced it. Nothing is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDailyRecord {
    /// Date string, expected `YYYY-MM-DD`.
    pub date: String,
    /// Incident count.
    pub count: u64,
    /// Moon phase fraction.
    #[serde(alias = "moon_phase")]
    pub moon_phase: f64,
    /// Upstream full-moon flag.
    #[serde(alias = "is_full_moon")]
    pub is_full_moon: bool,
}

/// A city dataset exactly as the loader produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCityDataset {
    /// Correlation coefficient.
    pub correlation: f64,
    /// p-value of the correlation.
    #[serde(alias = "p_value")]
    pub p_value: f64,
    /// Unvalidated daily records.
    #[serde(alias = "daily_data")]
    pub daily_data: Vec<RawDailyRecord>,
}

/// The loader's document: one raw dataset per city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSnapshot {
    /// Datasets keyed by city.
    pub cities: BTreeMap<CityId, RawCityDataset>,
}

/// Validated datasets for every city present in the loaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    /// Datasets keyed by city.
    pub cities: BTreeMap<CityId, CityDataset>,
}

impl Snapshot {
    /// Returns the dataset for `city`, if it was loaded.
    #[must_use]
    pub fn get(&self, city: CityId) -> Option<&CityDataset> {
        self.cities.get(&city)
    }
}
