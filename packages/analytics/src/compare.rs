//! Per-city headline statistics and the cross-city comparison.
//!
//! The comparison has two halves. Population and significance figures need
//! only each city's totals and p-value, so they always cover every loaded
//! city. Effect-size figures need a full-moon split, which can fail for a
//! city (for example, one with no flagged full-moon days); such cities are
//! left out of those figures only and reported as missing.

use lunar_crime_analytics_models::{CityStatistics, CitySummary, CrossCityComparison, EffectSize};
use lunar_crime_lunar_models::{CityDataset, CityId};

use crate::{
    AnalyticsError,
    effect::full_moon_effect,
    significance::{classify_significance, correlation_strength},
};

/// Credit awarded per significant city when not every city is
/// significant. Three partial credits sum to 99.99, not 100; only the
/// all-significant case reports exactly 100.
pub const SIGNIFICANCE_CREDIT_PER_CITY: f64 = 33.33;

/// Computes the split-independent figures for one city.
#[must_use]
pub fn city_summary(city: CityId, dataset: &CityDataset) -> CitySummary {
    CitySummary {
        city,
        total_incidents: dataset.total_incidents(),
        total_days: dataset.daily_data.len() as u64,
        p_value: dataset.p_value,
        significance: classify_significance(dataset.p_value),
        correlation: dataset.correlation,
        correlation_strength: correlation_strength(dataset.correlation),
    }
}

/// Computes the headline statistics for one city.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if the city has no full-moon
/// days or no other days, or [`AnalyticsError::DegenerateBaseline`] if its
/// non-full-moon days average zero.
pub fn city_statistics(
    city: CityId,
    dataset: &CityDataset,
) -> Result<CityStatistics, AnalyticsError> {
    let (split, effect_size) = full_moon_effect(&dataset.daily_data)?;
    let summary = city_summary(city, dataset);

    log::debug!(
        "city_statistics: {city} full-moon avg {:.2} over {} day(s), baseline avg {:.2} over {} day(s), {:+.2}%",
        split.matched.average,
        split.matched.sample_size,
        split.unmatched.average,
        split.unmatched.sample_size,
        effect_size.percent_difference,
    );

    Ok(CityStatistics {
        city,
        total_incidents: summary.total_incidents,
        total_days: summary.total_days,
        full_moon: split.matched,
        non_full_moon: split.unmatched,
        effect_size,
        p_value: summary.p_value,
        significance: summary.significance,
        correlation: summary.correlation,
        correlation_strength: summary.correlation_strength,
    })
}

/// Largest absolute gap between any two cities' percent differences.
///
/// Fewer than two cities have no pairs and yield `0.0`.
#[must_use]
pub fn effect_consistency(effects: &[(CityId, EffectSize)]) -> f64 {
    let mut widest = 0.0_f64;
    for (i, (_, a)) in effects.iter().enumerate() {
        for (_, b) in &effects[i + 1..] {
            widest = widest.max((a.percent_difference - b.percent_difference).abs());
        }
    }
    widest
}

/// Combined significance score: `100` when every city is significant,
/// otherwise [`SIGNIFICANCE_CREDIT_PER_CITY`] per significant city.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn combined_significance(summaries: &[CitySummary]) -> f64 {
    let significant = summaries
        .iter()
        .filter(|s| s.significance.is_significant())
        .count();

    if !summaries.is_empty() && significant == summaries.len() {
        100.0
    } else {
        significant as f64 * SIGNIFICANCE_CREDIT_PER_CITY
    }
}

/// Ratio of the largest to the smallest city by total incidents.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientCities`] if `summaries` is empty
/// or [`AnalyticsError::DegenerateBaseline`] if the smallest total is zero.
#[allow(clippy::cast_precision_loss)]
pub fn population_factor(summaries: &[CitySummary]) -> Result<f64, AnalyticsError> {
    let totals = summaries.iter().map(|s| s.total_incidents);
    let max = totals.clone().max().ok_or(AnalyticsError::InsufficientCities)?;
    let min = totals.min().ok_or(AnalyticsError::InsufficientCities)?;

    if min == 0 {
        return Err(AnalyticsError::DegenerateBaseline {
            context: "smallest city total incident count".to_string(),
        });
    }

    Ok(max as f64 / min as f64)
}

/// Combines every city's summary, plus the effect sizes of the cities that
/// have one, into a comparative summary.
///
/// Effect sizes for cities absent from `summaries` are ignored.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientCities`] if `summaries` is empty
/// or [`AnalyticsError::DegenerateBaseline`] if a city has zero incidents.
pub fn compare_cities(
    summaries: &[CitySummary],
    effects: &[(CityId, EffectSize)],
) -> Result<CrossCityComparison, AnalyticsError> {
    let population_factor = population_factor(summaries)?;

    let cities: Vec<CityId> = summaries.iter().map(|s| s.city).collect();
    let effects: Vec<(CityId, EffectSize)> = effects
        .iter()
        .filter(|(city, _)| cities.contains(city))
        .copied()
        .collect();

    let strongest = effects
        .iter()
        .max_by(|(_, a), (_, b)| a.normalized_ratio.total_cmp(&b.normalized_ratio));

    let missing_effect_cities: Vec<CityId> = cities
        .iter()
        .copied()
        .filter(|city| !effects.iter().any(|(c, _)| c == city))
        .collect();
    if !missing_effect_cities.is_empty() {
        log::warn!(
            "compare_cities: no effect size for {missing_effect_cities:?}; effect figures cover {} of {} cities",
            effects.len(),
            cities.len()
        );
    }

    let comparison = CrossCityComparison {
        population_factor,
        max_normalized_ratio: strongest.map(|(_, effect)| effect.normalized_ratio),
        max_ratio_city: strongest.map(|(city, _)| *city),
        effect_consistency: effect_consistency(&effects),
        combined_significance: combined_significance(summaries),
        significant_cities: summaries
            .iter()
            .filter(|s| s.significance.is_significant())
            .map(|s| s.city)
            .collect(),
        missing_effect_cities,
        cities,
    };

    log::debug!(
        "compare_cities: {} cities, population factor {:.2}, max ratio {:?} ({:?}), combined significance {:.2}",
        comparison.cities.len(),
        comparison.population_factor,
        comparison.max_normalized_ratio,
        comparison.max_ratio_city,
        comparison.combined_significance,
    );

    Ok(comparison)
}
