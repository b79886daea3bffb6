//! Conversion of the loader's raw document into validated datasets.
//!
//! The loader hands over dates as strings and performs no checks. This
//! module enforces the per-city invariants the rest of the engine relies
//! on: parseable and unique dates, phases in `[0, 1)`, and an in-range
//! correlation/p-value pair.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use lunar_crime_lunar_models::{
    CityDataset, CityId, DailyRecord, MoonPhase, RawCityDataset, RawDailyRecord, RawSnapshot,
    Snapshot,
};

use crate::AnalyticsError;

/// Parses a date string like `"2024-01-01"`.
///
/// A full timestamp (`"2024-01-01T00:00:00"`, optionally with fractional
/// seconds) is accepted and its time discarded. Anything else after the
/// date is rejected.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDateRange`] if the string is not a
/// valid calendar date or timestamp.
pub fn parse_date(s: &str) -> Result<NaiveDate, AnalyticsError> {
    let trimmed = s.trim();

    if trimmed.contains('T') {
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(naive.date());
            }
        }
        return Err(AnalyticsError::InvalidDateRange {
            message: format!("Invalid timestamp '{s}'. Expected format: YYYY-MM-DDTHH:MM:SS"),
        });
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| AnalyticsError::InvalidDateRange {
        message: format!("Invalid date '{s}': {e}. Expected format: YYYY-MM-DD"),
    })
}

/// Checks that no date appears twice in a series.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDateRange`] naming the first repeated
/// date.
pub fn validate_series(records: &[DailyRecord]) -> Result<(), AnalyticsError> {
    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert(record.date) {
            return Err(AnalyticsError::InvalidDateRange {
                message: format!("Duplicate date {} in series", record.date),
            });
        }
    }
    Ok(())
}

fn validate_record(raw: &RawDailyRecord) -> Result<DailyRecord, AnalyticsError> {
    let date = parse_date(&raw.date)?;
    MoonPhase::from_fraction(raw.moon_phase)?;

    Ok(DailyRecord {
        date,
        count: raw.count,
        moon_phase: raw.moon_phase,
        is_full_moon: raw.is_full_moon,
    })
}

/// Validates one city's raw dataset.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidStatistic`] if the correlation is outside
///   `[-1, 1]` or the p-value is negative or not finite.
/// * [`AnalyticsError::InvalidDateRange`] if a date is unparseable or
///   repeated.
/// * [`AnalyticsError::InvalidPhaseValue`] if a phase is outside `[0, 1)`.
pub fn validate_city(city: CityId, raw: &RawCityDataset) -> Result<CityDataset, AnalyticsError> {
    if !(-1.0..=1.0).contains(&raw.correlation) {
        return Err(AnalyticsError::InvalidStatistic {
            field: "correlation",
            value: raw.correlation,
            expected: "[-1, 1]",
        });
    }
    if !raw.p_value.is_finite() || raw.p_value < 0.0 {
        return Err(AnalyticsError::InvalidStatistic {
            field: "p-value",
            value: raw.p_value,
            expected: "a finite value >= 0",
        });
    }

    let daily_data = raw
        .daily_data
        .iter()
        .map(validate_record)
        .collect::<Result<Vec<_>, _>>()?;
    validate_series(&daily_data)?;

    log::debug!(
        "validate_city: {city} has {} daily records",
        daily_data.len()
    );

    Ok(CityDataset {
        correlation: raw.correlation,
        p_value: raw.p_value,
        daily_data,
    })
}

/// Validates every city in the raw document.
///
/// Cities that fail validation are left out of the returned snapshot and
/// reported alongside it, so one bad dataset does not block the others.
#[must_use]
pub fn validate_snapshot(raw: &RawSnapshot) -> (Snapshot, Vec<(CityId, AnalyticsError)>) {
    let mut snapshot = Snapshot::default();
    let mut rejected = Vec::new();

    for (city, dataset) in &raw.cities {
        match validate_city(*city, dataset) {
            Ok(valid) => {
                snapshot.cities.insert(*city, valid);
            }
            Err(e) => {
                log::warn!("Rejecting dataset for {city}: {e}");
                rejected.push((*city, e));
            }
        }
    }

    (snapshot, rejected)
}
