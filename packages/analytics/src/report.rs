//! Per-city report assembly and memoization.
//!
//! A [`CityReport`] carries every derived value the display layer shows for
//! a city. Each fallible section is computed independently, so a city with
//! no full-moon days still gets its monthly, weekday, and hourly views.
//!
//! [`ReportCache`] keys reports by `(CityId, fingerprint)`, where the
//! fingerprint is an MD5 digest of the dataset contents. A changed dataset
//! produces a new fingerprint and is recomputed; an unchanged one is served
//! from the cache.

use std::collections::BTreeMap;

use lunar_crime_analytics_models::{CityReport, Computed, CrossCityComparison};
use lunar_crime_lunar_models::{CityDataset, CityId, DailyRecord, Snapshot};

use crate::{
    AnalyticsError,
    compare::{city_statistics, city_summary, compare_cities},
    phase::phase_breakdown,
    temporal::{hourly_profile, monthly_buckets, weekday_buckets},
};

/// Wraps a section result, logging why it is unavailable.
fn computed<T>(city: CityId, section: &str, result: Result<T, AnalyticsError>) -> Computed<T> {
    match result {
        Ok(value) => Computed::Ready(value),
        Err(e) => {
            log::warn!("{city} {section} unavailable: {e}");
            Computed::Unavailable {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}

/// Computes a fingerprint of a dataset's contents.
///
/// Records are hashed in date order, so two datasets holding the same
/// records in a different order share a fingerprint.
#[must_use]
pub fn dataset_fingerprint(dataset: &CityDataset) -> String {
    let mut records: Vec<&DailyRecord> = dataset.daily_data.iter().collect();
    records.sort_by_key(|r| r.date);

    let mut context = md5::Context::new();
    context.consume(dataset.correlation.to_bits().to_le_bytes());
    context.consume(dataset.p_value.to_bits().to_le_bytes());
    for record in records {
        context.consume(record.date.to_string().as_bytes());
        context.consume(record.count.to_le_bytes());
        context.consume(record.moon_phase.to_bits().to_le_bytes());
        context.consume([u8::from(record.is_full_moon)]);
    }
    format!("{:x}", context.finalize())
}

/// Computes every section of a city's report.
#[must_use]
pub fn build_city_report(city: CityId, dataset: &CityDataset) -> CityReport {
    let records = &dataset.daily_data;

    CityReport {
        city,
        fingerprint: dataset_fingerprint(dataset),
        summary: city_summary(city, dataset),
        statistics: computed(city, "statistics", city_statistics(city, dataset)),
        monthly: computed(city, "monthly", monthly_buckets(records)),
        weekday: computed(city, "weekday", weekday_buckets(records)),
        hourly: computed(city, "hourly", hourly_profile(records)),
        phases: computed(city, "phases", phase_breakdown(records)),
    }
}

/// Builds the report for a single city in the snapshot.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownCity`] if the snapshot has no dataset
/// for `city`.
pub fn city_report(snapshot: &Snapshot, city: CityId) -> Result<CityReport, AnalyticsError> {
    snapshot
        .get(city)
        .map(|dataset| build_city_report(city, dataset))
        .ok_or(AnalyticsError::UnknownCity { city })
}

/// Builds reports for every city in the snapshot, in city order.
#[must_use]
pub fn build_snapshot_reports(snapshot: &Snapshot) -> Vec<CityReport> {
    snapshot
        .cities
        .iter()
        .map(|(city, dataset)| build_city_report(*city, dataset))
        .collect()
}

/// Compares every report.
///
/// Population and significance figures use every city. Cities whose
/// statistics are unavailable are left out of the effect-size figures only
/// and listed as missing in the result.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientCities`] if `reports` is empty,
/// or any error from [`compare_cities`](crate::compare::compare_cities).
pub fn build_comparison(reports: &[CityReport]) -> Result<CrossCityComparison, AnalyticsError> {
    let summaries: Vec<_> = reports.iter().map(|report| report.summary).collect();
    let effects: Vec<_> = reports
        .iter()
        .filter_map(|report| {
            report
                .statistics
                .ready()
                .map(|stats| (report.city, stats.effect_size))
        })
        .collect();

    compare_cities(&summaries, &effects)
}

/// Memoizes city reports by dataset fingerprint.
///
/// The cache is owned by its caller. At most one report is kept per city:
/// a report for a new fingerprint replaces the old one.
#[derive(Debug, Default)]
pub struct ReportCache {
    entries: BTreeMap<CityId, CityReport>,
    hits: u64,
    misses: u64,
}

impl ReportCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached report for `city` if its fingerprint matches
    /// `dataset`, otherwise computes, stores, and returns a fresh one.
    pub fn get_or_build(&mut self, city: CityId, dataset: &CityDataset) -> &CityReport {
        let fingerprint = dataset_fingerprint(dataset);

        let stale = self
            .entries
            .get(&city)
            .is_none_or(|cached| cached.fingerprint != fingerprint);

        if stale {
            log::debug!("ReportCache: computing {city} ({fingerprint})");
            self.misses += 1;
            self.entries.insert(city, build_city_report(city, dataset));
        } else {
            self.hits += 1;
        }

        &self.entries[&city]
    }

    /// Returns the cached report for `city`, whatever its fingerprint.
    #[must_use]
    pub fn get(&self, city: CityId) -> Option<&CityReport> {
        self.entries.get(&city)
    }

    /// Number of lookups served from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that computed a report.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops every cached report. The hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
