//! Effect size between a treatment and a baseline group average.

use lunar_crime_analytics_models::{EffectSize, GroupStats, PartitionStats};
use lunar_crime_lunar_models::DailyRecord;

use crate::{AnalyticsError, groups::full_moon_split};

/// Computes the percent difference and normalized ratio of `treatment`
/// relative to `baseline`.
///
/// Positive `percent_difference` means the treatment average is higher.
///
/// # Errors
///
/// Returns [`AnalyticsError::DegenerateBaseline`] if the baseline average is
/// zero.
#[allow(clippy::float_cmp)]
pub fn effect_size(
    treatment: &GroupStats,
    baseline: &GroupStats,
) -> Result<EffectSize, AnalyticsError> {
    if baseline.average == 0.0 {
        return Err(AnalyticsError::DegenerateBaseline {
            context: format!(
                "baseline average over {} day(s)",
                baseline.sample_size
            ),
        });
    }

    Ok(EffectSize {
        percent_difference: (treatment.average - baseline.average) / baseline.average * 100.0,
        normalized_ratio: treatment.average / baseline.average,
    })
}

/// Effect size of a predicate split: `matched` is the treatment group.
///
/// # Errors
///
/// Returns [`AnalyticsError::DegenerateBaseline`] if the unmatched average is
/// zero.
pub fn partition_effect(stats: &PartitionStats) -> Result<EffectSize, AnalyticsError> {
    effect_size(&stats.matched, &stats.unmatched)
}

/// Splits records on `is_full_moon` and computes the full-moon effect.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if either side of the split is
/// empty, or [`AnalyticsError::DegenerateBaseline`] if non-full-moon days
/// average zero.
pub fn full_moon_effect<'a, I>(records: I) -> Result<(PartitionStats, EffectSize), AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let stats = full_moon_split(records)?;
    let effect = partition_effect(&stats)?;
    Ok((stats, effect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series;

    fn stats(average: f64) -> GroupStats {
        GroupStats {
            average,
            sample_size: 10,
        }
    }

    #[test]
    fn elevated_treatment_is_positive() {
        let effect = effect_size(&stats(8.0), &stats(5.0)).unwrap();
        assert!((effect.percent_difference - 60.0).abs() < 1e-9);
        assert!((effect.normalized_ratio - 1.6).abs() < 1e-9);
    }

    #[test]
    fn lower_treatment_is_negative() {
        let effect = effect_size(&stats(4.0), &stats(5.0)).unwrap();
        assert!((effect.percent_difference - -20.0).abs() < 1e-9);
        assert!((effect.normalized_ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn unit_ratio_iff_zero_difference() {
        for avg in [0.5, 1.0, 3.25, 17.0, 1234.5] {
            let effect = effect_size(&stats(avg), &stats(avg)).unwrap();
            assert_eq!(effect.normalized_ratio, 1.0);
            assert_eq!(effect.percent_difference, 0.0);
        }
        for (t, b) in [(2.0, 1.0), (1.0, 2.0), (5.5, 5.0)] {
            let effect = effect_size(&stats(t), &stats(b)).unwrap();
            assert_ne!(effect.normalized_ratio, 1.0);
            assert_ne!(effect.percent_difference, 0.0);
        }
    }

    #[test]
    fn zero_baseline_is_degenerate() {
        let err = effect_size(&stats(3.0), &stats(0.0)).unwrap_err();
        assert!(matches!(err, AnalyticsError::DegenerateBaseline { .. }));
    }

    #[test]
    fn full_moon_effect_example() {
        let mut records = series("2024-01-01", 10, |_| (5, false));
        records.extend(series("2024-03-01", 3, |_| (8, true)));

        let (split, effect) = full_moon_effect(&records).unwrap();
        assert!((split.unmatched.average - 5.0).abs() < f64::EPSILON);
        assert!((split.matched.average - 8.0).abs() < f64::EPSILON);
        assert!((effect.percent_difference - 60.0).abs() < 1e-9);
        assert!((effect.normalized_ratio - 1.6).abs() < 1e-9);
    }

    #[test]
    fn full_moon_effect_with_zero_baseline() {
        let mut records = series("2024-01-01", 4, |_| (0, false));
        records.extend(series("2024-02-01", 2, |_| (3, true)));
        assert!(matches!(
            full_moon_effect(&records),
            Err(AnalyticsError::DegenerateBaseline { .. })
        ));
    }
}
