#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics engine relating lunar phase to daily incident counts.
//!
//! Every public function is a pure, synchronous computation over an
//! immutable [`CityDataset`](lunar_crime_lunar_models::CityDataset) (or a
//! slice of its records) and returns typed results from
//! [`lunar_crime_analytics_models`]. Degenerate inputs surface as an
//! [`AnalyticsError`], never as NaN or infinity.
//!
//! The modules mirror the components of the engine:
//!
//! * [`validate`] turns the loader's raw document into validated datasets.
//! * [`phase`] classifies moon-phase fractions and averages per phase.
//! * [`groups`] and [`effect`] compute full-moon vs. baseline averages and
//!   the effect size between them.
//! * [`temporal`] aggregates by month, weekday, and a synthetic hourly
//!   model.
//! * [`significance`] labels p-values and correlation magnitudes.
//! * [`compare`] builds per-city statistics and the cross-city summary.
//! * [`report`] assembles everything per city and memoizes by dataset
//!   fingerprint.

pub mod compare;
pub mod effect;
pub mod groups;
pub mod phase;
pub mod report;
pub mod significance;
pub mod temporal;
pub mod validate;

use lunar_crime_analytics_models::ErrorKind;
use lunar_crime_lunar_models::{CityId, InvalidPhaseError};
use thiserror::Error;

/// Errors that can occur while deriving statistics.
///
/// All of them are local to the statistic being computed: callers decide
/// whether to render "insufficient data" and carry on with the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// A required subset had zero members.
    #[error("Empty partition: no {subset}")]
    EmptyPartition {
        /// Description of the empty subset.
        subset: String,
    },

    /// A ratio was requested against a zero baseline.
    #[error("Degenerate baseline: {context} is zero")]
    DegenerateBaseline {
        /// Description of the zero-valued baseline.
        context: String,
    },

    /// A moon-phase fraction fell outside `[0, 1)`.
    #[error("Invalid moon phase {value}: expected [0, 1)")]
    InvalidPhaseValue {
        /// The offending fraction.
        value: f64,
    },

    /// A date was unparseable or repeated within one series.
    #[error("Invalid date range: {message}")]
    InvalidDateRange {
        /// Description of what went wrong.
        message: String,
    },

    /// A dataset-level statistic was out of range.
    #[error("Invalid {field} {value}: expected {expected}")]
    InvalidStatistic {
        /// Which statistic.
        field: &'static str,
        /// The offending value.
        value: f64,
        /// The accepted range.
        expected: &'static str,
    },

    /// A comparison needs at least one city.
    #[error("Cross-city comparison requires at least one city with statistics")]
    InsufficientCities,

    /// The requested city is not in the snapshot.
    #[error("No dataset loaded for {city}")]
    UnknownCity {
        /// The requested city.
        city: CityId,
    },
}

impl AnalyticsError {
    /// Returns the serializable category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPartition { .. } => ErrorKind::EmptyPartition,
            Self::DegenerateBaseline { .. } => ErrorKind::DegenerateBaseline,
            Self::InvalidPhaseValue { .. } => ErrorKind::InvalidPhaseValue,
            Self::InvalidDateRange { .. } => ErrorKind::InvalidDateRange,
            Self::InvalidStatistic { .. } => ErrorKind::InvalidStatistic,
            Self::InsufficientCities => ErrorKind::InsufficientCities,
            Self::UnknownCity { .. } => ErrorKind::UnknownCity,
        }
    }
}

impl From<InvalidPhaseError> for AnalyticsError {
    fn from(e: InvalidPhaseError) -> Self {
        Self::InvalidPhaseValue { value: e.value }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use lunar_crime_lunar_models::DailyRecord;

    /// Builds a record on the given date.
    pub fn record(date: &str, count: u64, is_full_moon: bool) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            count,
            moon_phase: if is_full_moon { 0.68 } else { 0.2 },
            is_full_moon,
        }
    }

    /// Builds `n` consecutive daily records starting at `start`, calling
    /// `f(day_index)` for `(count, is_full_moon)`.
    pub fn series(
        start: &str,
        n: u32,
        f: impl Fn(u32) -> (u64, bool),
    ) -> Vec<DailyRecord> {
        let first = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        (0..n)
            .map(|i| {
                let (count, is_full_moon) = f(i);
                DailyRecord {
                    date: first + chrono::Days::new(u64::from(i)),
                    count,
                    moon_phase: f64::from(i % 30) / 30.0,
                    is_full_moon,
                }
            })
            .collect()
    }
}
