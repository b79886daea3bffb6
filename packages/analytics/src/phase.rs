//! Moon-phase classification and per-phase averages.

use lunar_crime_analytics_models::PhaseBucket;
use lunar_crime_lunar_models::{DailyRecord, MoonPhase};

use crate::AnalyticsError;

/// Classifies a cycle fraction into one of the eight named phases.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPhaseValue`] if `fraction` is outside
/// `[0, 1)`.
pub fn classify_phase(fraction: f64) -> Result<MoonPhase, AnalyticsError> {
    Ok(MoonPhase::from_fraction(fraction)?)
}

/// Averages daily counts per phase category.
///
/// Always returns eight buckets in cycle order. Phases with no days carry
/// `total_days = 0` and an average of `0.0`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPhaseValue`] if any record's phase is
/// outside `[0, 1)`.
#[allow(clippy::cast_precision_loss)]
pub fn phase_breakdown<'a, I>(records: I) -> Result<Vec<PhaseBucket>, AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut sums = [(0u64, 0u64); 8];

    for record in records {
        let phase = classify_phase(record.moon_phase)?;
        let slot = &mut sums[phase.index()];
        slot.0 = slot.0.saturating_add(record.count);
        slot.1 += 1;
    }

    Ok(MoonPhase::all()
        .iter()
        .zip(sums)
        .map(|(phase, (sum, days))| PhaseBucket {
            phase: *phase,
            average: if days == 0 {
                0.0
            } else {
                sum as f64 / days as f64
            },
            total_days: days,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn classifies_every_band_boundary() {
        let cases = [
            (0.0, MoonPhase::NewMoon),
            (0.124_999, MoonPhase::NewMoon),
            (0.125, MoonPhase::WaxingCrescent),
            (0.249_999, MoonPhase::WaxingCrescent),
            (0.25, MoonPhase::FirstQuarter),
            (0.374_999, MoonPhase::FirstQuarter),
            (0.375, MoonPhase::WaxingGibbous),
            (0.5, MoonPhase::WaxingGibbous),
            (0.624_999, MoonPhase::WaxingGibbous),
            (0.625, MoonPhase::FullMoon),
            (0.749_999, MoonPhase::FullMoon),
            (0.75, MoonPhase::WaningGibbous),
            (0.874_999, MoonPhase::WaningGibbous),
            (0.875, MoonPhase::LastQuarter),
            (0.949_999, MoonPhase::LastQuarter),
            (0.95, MoonPhase::WaningCrescent),
            (0.999_999, MoonPhase::WaningCrescent),
        ];

        for (fraction, expected) in cases {
            assert_eq!(
                classify_phase(fraction).unwrap(),
                expected,
                "fraction {fraction}"
            );
        }
    }

    #[test]
    fn classification_is_total_over_unit_interval() {
        let mut seen = [false; 8];
        for i in 0..10_000 {
            let fraction = f64::from(i) / 10_000.0;
            let phase = classify_phase(fraction).unwrap();
            let (lower, upper) = phase.band();
            assert!(
                fraction >= lower && fraction < upper,
                "{fraction} outside {phase} band"
            );
            seen[phase.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        for bad in [-0.000_001, 1.0, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                classify_phase(bad),
                Err(AnalyticsError::InvalidPhaseValue { .. })
            ));
        }
    }

    #[test]
    fn breakdown_has_eight_buckets() {
        let mut records = vec![
            record("2024-01-01", 10, false),
            record("2024-01-02", 20, false),
            record("2024-01-03", 30, true),
        ];
        records[0].moon_phase = 0.01;
        records[1].moon_phase = 0.02;
        records[2].moon_phase = 0.7;

        let buckets = phase_breakdown(&records).unwrap();
        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].phase, MoonPhase::NewMoon);
        assert_eq!(buckets[0].total_days, 2);
        assert!((buckets[0].average - 15.0).abs() < f64::EPSILON);
        assert_eq!(buckets[4].phase, MoonPhase::FullMoon);
        assert!((buckets[4].average - 30.0).abs() < f64::EPSILON);
        assert_eq!(buckets.iter().map(|b| b.total_days).sum::<u64>(), 3);
        assert_eq!(buckets[1].total_days, 0);
    }

    #[test]
    fn breakdown_sums_saturate() {
        let mut records = vec![
            record("2024-01-01", u64::MAX, false),
            record("2024-01-02", 5, false),
        ];
        records[0].moon_phase = 0.01;
        records[1].moon_phase = 0.02;

        let buckets = phase_breakdown(&records).unwrap();
        assert_eq!(buckets[0].total_days, 2);
        assert!(buckets[0].average.is_finite());
    }

    #[test]
    fn breakdown_propagates_invalid_phase() {
        let mut records = vec![record("2024-01-01", 10, false)];
        records[0].moon_phase = 1.2;
        assert!(phase_breakdown(&records).is_err());
    }
}
