//! Temporal aggregations: by calendar month, by weekday, and a synthetic
//! hourly model.
//!
//! The monthly and weekday passes are independent, order-insensitive
//! groupings of the same record set. Missing days are absent data: they
//! lower a month's completeness but never count as zero-incident days.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use chrono::{Datelike as _, NaiveDate};
use lunar_crime_analytics_models::{
    HourProfile, MonthBucket, MonthKey, SyntheticHourlyProfile, WeekdayBucket,
};
use lunar_crime_lunar_models::{DailyRecord, DayOfWeek};

use crate::{
    AnalyticsError,
    effect::full_moon_effect,
    groups::{city_mean_daily_count, group_average},
    validate::validate_series,
};

/// Provenance note attached to every [`SyntheticHourlyProfile`].
pub const SYNTHETIC_HOURLY_NOTE: &str = "Modeled curve, not measured data: the source dataset has \
     no per-hour counts. Rates are the city-wide daily mean shaped by a fixed sinusoid and a \
     seeded jitter.";

/// Hours in the synthetic profile.
pub const HOURS_PER_DAY: u8 = 24;

/// Salt for the baseline jitter sequence.
const BASELINE_SALT: u32 = 1;
/// Salt for the full-moon jitter sequence.
const FULL_MOON_SALT: u32 = 2;
/// Salt for the full-moon lift sequence.
const LIFT_SALT: u32 = 3;

/// Jitter spans `[JITTER_MIN, JITTER_MIN + JITTER_SPAN)`.
const JITTER_MIN: f64 = 0.85;
const JITTER_SPAN: f64 = 0.3;

/// Full-moon lift spans `[1.0, 1.0 + LIFT_SPAN)`.
const LIFT_SPAN: f64 = 0.6;

/// Number of days in the given calendar month, accounting for leap years.
///
/// Returns `None` for an invalid year/month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Figures shared by month and weekday buckets.
struct BucketSummary {
    average: f64,
    full_moon_average: f64,
    has_full_moon_data: bool,
    full_moon_day_count: u64,
    total_days: u64,
    full_moon_change_percent: Option<f64>,
}

fn summarize(records: &[&DailyRecord]) -> BucketSummary {
    let average = group_average(records.iter().copied(), |_| true, "days in bucket")
        .map_or(0.0, |stats| stats.average);
    let full_moon = group_average(records.iter().copied(), |r| r.is_full_moon, "full-moon days").ok();

    // Either side missing, or a zero baseline, leaves the change undefined.
    let full_moon_change_percent = full_moon_effect(records.iter().copied())
        .ok()
        .map(|(_, effect)| effect.percent_difference);

    BucketSummary {
        average,
        full_moon_average: full_moon.map_or(0.0, |stats| stats.average),
        has_full_moon_data: full_moon.is_some(),
        full_moon_day_count: full_moon.map_or(0, |stats| stats.sample_size),
        total_days: records.len() as u64,
        full_moon_change_percent,
    }
}

/// Groups records by calendar month, in ascending month order.
///
/// Only months with at least one observed day get a bucket.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDateRange`] if a date repeats, since
/// completeness counts distinct days.
#[allow(clippy::cast_precision_loss)]
pub fn monthly_buckets(records: &[DailyRecord]) -> Result<Vec<MonthBucket>, AnalyticsError> {
    validate_series(records)?;

    let mut months: BTreeMap<MonthKey, Vec<&DailyRecord>> = BTreeMap::new();
    for record in records {
        let key = MonthKey {
            year: record.date.year(),
            month: record.date.month(),
        };
        months.entry(key).or_default().push(record);
    }

    let mut buckets = Vec::with_capacity(months.len());
    for (month_key, days) in months {
        let calendar_days = days_in_month(month_key.year, month_key.month).ok_or_else(|| {
            AnalyticsError::InvalidDateRange {
                message: format!("No calendar month {month_key}"),
            }
        })?;
        let distinct_days = days.iter().map(|r| r.date.day()).collect::<BTreeSet<_>>().len();
        let summary = summarize(&days);

        buckets.push(MonthBucket {
            month_key,
            average: summary.average,
            full_moon_average: summary.full_moon_average,
            has_full_moon_data: summary.has_full_moon_data,
            full_moon_day_count: summary.full_moon_day_count,
            total_days: summary.total_days,
            completeness: distinct_days as f64 / f64::from(calendar_days),
            full_moon_change_percent: summary.full_moon_change_percent,
        });
    }

    log::debug!(
        "monthly_buckets: {} record(s) -> {} month(s)",
        records.len(),
        buckets.len()
    );

    Ok(buckets)
}

/// Groups records by day of week.
///
/// Always returns seven buckets, Sunday first. A weekday with no records
/// has `total_days = 0`, an average of `0.0`, and no percent change.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDateRange`] if a date repeats, since a
/// repeated day would be counted twice.
pub fn weekday_buckets(records: &[DailyRecord]) -> Result<Vec<WeekdayBucket>, AnalyticsError> {
    validate_series(records)?;

    let mut days: [Vec<&DailyRecord>; 7] = std::array::from_fn(|_| Vec::new());
    for record in records {
        days[usize::from(DayOfWeek::of(record.date).index())].push(record);
    }

    Ok(DayOfWeek::all()
        .iter()
        .zip(days.iter())
        .map(|(day, records)| {
            let summary = summarize(records);
            WeekdayBucket {
                weekday: day.index(),
                day: *day,
                average: summary.average,
                full_moon_average: summary.full_moon_average,
                has_full_moon_data: summary.has_full_moon_data,
                full_moon_day_count: summary.full_moon_day_count,
                total_days: summary.total_days,
                full_moon_change_percent: summary.full_moon_change_percent,
            }
        })
        .collect())
}

/// Daily-cycle shape: `sin((hour - 6) * PI / 12) + 1.5`.
///
/// Ranges over `[0.5, 2.5]`, lowest at hour 0 and highest at hour 12.
#[must_use]
pub fn sinusoidal_factor(hour: u8) -> f64 {
    ((f64::from(hour) - 6.0) * PI / 12.0).sin() + 1.5
}

/// Deterministic pseudo-random value in `[0, 1)` for `(hour, salt)`.
///
/// Classic sine hash: the same inputs always yield the same value.
#[must_use]
pub fn seeded_unit(hour: u8, salt: u32) -> f64 {
    let seed = f64::from(hour).mul_add(12.9898, f64::from(salt) * 78.233);
    let x = seed.sin() * 43_758.545_3;
    x - x.floor()
}

/// Multiplicative jitter in `[0.85, 1.15)`.
#[must_use]
pub fn jitter(hour: u8, salt: u32) -> f64 {
    JITTER_SPAN.mul_add(seeded_unit(hour, salt), JITTER_MIN)
}

/// Full-moon lift in `[1.0, 1.6)`.
#[must_use]
pub fn full_moon_lift(hour: u8) -> f64 {
    LIFT_SPAN.mul_add(seeded_unit(hour, LIFT_SALT), 1.0)
}

/// Builds the 24-hour model from a city-wide mean daily count.
///
/// This is an illustration, not an observation: the result is tagged
/// `synthetic: true`.
#[must_use]
pub fn hourly_profile_from_mean(city_mean_daily_count: f64) -> SyntheticHourlyProfile {
    let hours = (0..HOURS_PER_DAY)
        .map(|hour| {
            let shaped = city_mean_daily_count * sinusoidal_factor(hour);
            HourProfile {
                hour,
                baseline_rate: shaped * jitter(hour, BASELINE_SALT),
                full_moon_rate: shaped * jitter(hour, FULL_MOON_SALT) * full_moon_lift(hour),
            }
        })
        .collect();

    SyntheticHourlyProfile {
        synthetic: true,
        note: SYNTHETIC_HOURLY_NOTE.to_string(),
        city_mean_daily_count,
        hours,
    }
}

/// Builds the 24-hour model from a city's records.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if `records` is empty.
pub fn hourly_profile(records: &[DailyRecord]) -> Result<SyntheticHourlyProfile, AnalyticsError> {
    let mean = city_mean_daily_count(records)?;
    Ok(hourly_profile_from_mean(mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, series};

    #[test]
    fn calendar_month_lengths() {
        assert_eq!(days_in_month(2024, 1), Some(31));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn full_month_is_complete() {
        let records = series("2024-01-01", 31, |i| (10 + u64::from(i % 3), (24..27).contains(&i)));
        let buckets = monthly_buckets(&records).unwrap();
        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].completeness - 1.0).abs() < f64::EPSILON);
        assert_eq!(buckets[0].total_days, 31);
        assert_eq!(buckets[0].full_moon_day_count, 3);
        assert!(buckets[0].has_full_moon_data);
    }

    #[test]
    fn leap_february_is_complete_at_29_days() {
        let records = series("2024-02-01", 29, |_| (5, false));
        let buckets = monthly_buckets(&records).unwrap();
        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].completeness - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gaps_reduce_completeness_without_counting_as_zero() {
        let records = vec![
            record("2024-04-01", 10, false),
            record("2024-04-15", 20, true),
            record("2024-04-30", 30, false),
        ];
        let buckets = monthly_buckets(&records).unwrap();
        let april = &buckets[0];
        assert!((april.completeness - 3.0 / 30.0).abs() < 1e-12);
        assert!((april.average - 20.0).abs() < f64::EPSILON);
        assert!(april.completeness > 0.0 && april.completeness <= 1.0);
    }

    #[test]
    fn month_without_full_moon_is_flagged() {
        let records = series("2024-03-01", 10, |_| (7, false));
        let bucket = &monthly_buckets(&records).unwrap()[0];
        assert!(!bucket.has_full_moon_data);
        assert_eq!(bucket.full_moon_day_count, 0);
        assert!(bucket.full_moon_average.abs() < f64::EPSILON);
        assert_eq!(bucket.full_moon_change_percent, None);
    }

    #[test]
    fn month_change_uses_effect_size() {
        let mut records = series("2024-05-01", 10, |_| (5, false));
        records.extend(series("2024-05-20", 3, |_| (8, true)));
        let bucket = &monthly_buckets(&records).unwrap()[0];
        assert!((bucket.full_moon_change_percent.unwrap() - 60.0).abs() < 1e-9);
        assert!((bucket.full_moon_average - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn months_are_ordered_across_years() {
        let records = vec![
            record("2024-01-05", 1, false),
            record("2023-12-05", 1, false),
            record("2023-11-05", 1, false),
        ];
        let keys: Vec<String> = monthly_buckets(&records)
            .unwrap()
            .iter()
            .map(|b| b.month_key.to_string())
            .collect();
        assert_eq!(keys, ["2023-11", "2023-12", "2024-01"]);
    }

    #[test]
    fn monthly_rejects_duplicate_dates() {
        let records = vec![record("2024-01-05", 1, false), record("2024-01-05", 2, true)];
        assert!(matches!(
            monthly_buckets(&records),
            Err(AnalyticsError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn monthly_is_order_insensitive() {
        let records = series("2024-01-01", 90, |i| (u64::from(i * 7 % 11), i % 29 < 3));
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(monthly_buckets(&records).unwrap(), monthly_buckets(&reversed).unwrap());
    }

    #[test]
    fn full_year_has_seven_weekday_buckets() {
        let records = series("2023-01-01", 365, |i| (u64::from(i % 13), i % 30 < 3));
        let buckets = weekday_buckets(&records).unwrap();
        assert_eq!(buckets.len(), 7);
        assert_eq!(
            buckets.iter().map(|b| b.total_days).sum::<u64>(),
            records.len() as u64
        );
        for (i, bucket) in buckets.iter().enumerate() {
            assert_eq!(usize::from(bucket.weekday), i);
        }
        assert_eq!(buckets[0].day, DayOfWeek::Sunday);
        // 2023 started on a Sunday, so Sunday gets the extra day.
        assert_eq!(buckets[0].total_days, 53);
    }

    #[test]
    fn empty_weekdays_are_present_and_undefined() {
        // 2024-01-01 was a Monday; three days cover Monday through Wednesday.
        let records = series("2024-01-01", 3, |i| (4, i == 0));
        let buckets = weekday_buckets(&records).unwrap();
        assert_eq!(buckets.len(), 7);

        let sunday = &buckets[0];
        assert_eq!(sunday.total_days, 0);
        assert!(sunday.average.abs() < f64::EPSILON);
        assert!(!sunday.has_full_moon_data);
        assert_eq!(sunday.full_moon_change_percent, None);

        // Monday has a full-moon day but no baseline day.
        let monday = &buckets[1];
        assert_eq!(monday.total_days, 1);
        assert!(monday.has_full_moon_data);
        assert_eq!(monday.full_moon_change_percent, None);

        // Tuesday has a baseline day but no full-moon day.
        assert_eq!(buckets[2].full_moon_change_percent, None);
    }

    #[test]
    fn empty_records_still_give_seven_weekdays() {
        let buckets = weekday_buckets(&[]).unwrap();
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.total_days == 0));
    }

    #[test]
    fn weekday_rejects_duplicate_dates() {
        let records = vec![record("2024-01-07", 5, false), record("2024-01-07", 6, false)];
        assert!(matches!(
            weekday_buckets(&records),
            Err(AnalyticsError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn sinusoid_shape() {
        assert!((sinusoidal_factor(0) - 0.5).abs() < 1e-12);
        assert!((sinusoidal_factor(6) - 1.5).abs() < 1e-12);
        assert!((sinusoidal_factor(12) - 2.5).abs() < 1e-12);
        assert!((sinusoidal_factor(18) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn jitter_and_lift_stay_in_range() {
        for hour in 0..HOURS_PER_DAY {
            for salt in [BASELINE_SALT, FULL_MOON_SALT] {
                let j = jitter(hour, salt);
                assert!((JITTER_MIN..JITTER_MIN + JITTER_SPAN).contains(&j), "{hour}/{salt}: {j}");
            }
            let lift = full_moon_lift(hour);
            assert!((1.0..1.6).contains(&lift), "{hour}: {lift}");
        }
    }

    #[test]
    fn hourly_profile_is_deterministic_and_synthetic() {
        let a = hourly_profile_from_mean(412.5);
        let b = hourly_profile_from_mean(412.5);
        assert_eq!(a, b);
        assert!(a.synthetic);
        assert_eq!(a.hours.len(), 24);
        for (i, hour) in a.hours.iter().enumerate() {
            assert_eq!(usize::from(hour.hour), i);
            assert!(hour.baseline_rate > 0.0);
            assert!(hour.full_moon_rate > 0.0);
        }
    }

    #[test]
    fn salts_produce_different_sequences() {
        let baseline: Vec<f64> = (0..HOURS_PER_DAY).map(|h| jitter(h, BASELINE_SALT)).collect();
        let full_moon: Vec<f64> = (0..HOURS_PER_DAY).map(|h| jitter(h, FULL_MOON_SALT)).collect();
        assert_ne!(baseline, full_moon);
    }

    #[test]
    fn hourly_profile_needs_records() {
        assert!(matches!(
            hourly_profile(&[]),
            Err(AnalyticsError::EmptyPartition { .. })
        ));
        let records = series("2024-01-01", 4, |i| (u64::from(i) * 2, false));
        let profile = hourly_profile(&records).unwrap();
        assert!((profile.city_mean_daily_count - 3.0).abs() < f64::EPSILON);
    }
}
