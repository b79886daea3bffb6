//! Group averages over predicate-selected subsets of daily records.
//!
//! The full-moon split used everywhere in the engine goes through
//! [`full_moon_split`], so the city-wide figures and the per-bucket figures
//! in [`crate::temporal`] come from the same arithmetic.

use lunar_crime_analytics_models::{GroupStats, PartitionStats};
use lunar_crime_lunar_models::DailyRecord;

use crate::AnalyticsError;

/// Splits records into `(matched, unmatched)` by `predicate`.
///
/// Every input record lands in exactly one of the two halves.
pub fn partition<'a, I, P>(records: I, predicate: P) -> (Vec<&'a DailyRecord>, Vec<&'a DailyRecord>)
where
    I: IntoIterator<Item = &'a DailyRecord>,
    P: Fn(&DailyRecord) -> bool,
{
    records.into_iter().partition(|r| predicate(*r))
}

/// Mean of `count` over a subset, or `None` if the subset is empty.
///
/// The running sum saturates at `u64::MAX`.
#[allow(clippy::cast_precision_loss)]
fn mean<'a, I>(records: I) -> Option<GroupStats>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let (sum, n) = records
        .into_iter()
        .fold((0u64, 0u64), |(sum, n), r| (sum.saturating_add(r.count), n + 1));

    (n > 0).then(|| GroupStats {
        average: sum as f64 / n as f64,
        sample_size: n,
    })
}

/// Mean `count` over the records matching `predicate`.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if no record matches.
pub fn group_average<'a, I, P>(
    records: I,
    predicate: P,
    subset: &str,
) -> Result<GroupStats, AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
    P: Fn(&DailyRecord) -> bool,
{
    mean(records.into_iter().filter(|r| predicate(*r))).ok_or_else(|| {
        AnalyticsError::EmptyPartition {
            subset: subset.to_string(),
        }
    })
}

/// Mean `count` over both sides of a predicate split.
///
/// `labels` name the matched and unmatched subsets in error messages.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if either side is empty.
pub fn partition_stats<'a, I, P>(
    records: I,
    predicate: P,
    labels: (&str, &str),
) -> Result<PartitionStats, AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
    P: Fn(&DailyRecord) -> bool,
{
    let (matched, unmatched) = partition(records, predicate);

    let matched = mean(matched).ok_or_else(|| AnalyticsError::EmptyPartition {
        subset: labels.0.to_string(),
    })?;
    let unmatched = mean(unmatched).ok_or_else(|| AnalyticsError::EmptyPartition {
        subset: labels.1.to_string(),
    })?;

    Ok(PartitionStats { matched, unmatched })
}

/// Splits records on the upstream `is_full_moon` flag.
///
/// `matched` is the full-moon (treatment) group, `unmatched` the baseline.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if there are no full-moon days
/// or no other days.
pub fn full_moon_split<'a, I>(records: I) -> Result<PartitionStats, AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    partition_stats(
        records,
        |r| r.is_full_moon,
        ("full-moon days", "non-full-moon days"),
    )
}

/// Mean daily count over every record.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyPartition`] if `records` is empty.
pub fn city_mean_daily_count<'a, I>(records: I) -> Result<f64, AnalyticsError>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    group_average(records, |_| true, "daily records").map(|stats| stats.average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, series};

    #[test]
    fn partition_is_disjoint_and_lossless() {
        let records = series("2024-01-01", 100, |i| (u64::from(i), i % 7 == 0));
        let (full, other) = partition(&records, |r| r.is_full_moon);

        assert_eq!(full.len() + other.len(), records.len());
        assert!(full.iter().all(|r| r.is_full_moon));
        assert!(other.iter().all(|r| !r.is_full_moon));

        let mut dates: Vec<_> = full.iter().chain(other.iter()).map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        assert_eq!(dates.len(), records.len());
    }

    #[test]
    fn full_moon_split_example() {
        let mut records = series("2024-01-01", 10, |_| (5, false));
        records.extend(series("2024-02-01", 3, |_| (8, true)));

        let stats = full_moon_split(&records).unwrap();
        assert!((stats.unmatched.average - 5.0).abs() < f64::EPSILON);
        assert!((stats.matched.average - 8.0).abs() < f64::EPSILON);
        assert_eq!(stats.unmatched.sample_size, 10);
        assert_eq!(stats.matched.sample_size, 3);
    }

    #[test]
    fn empty_full_moon_side_is_an_error() {
        let records = series("2024-01-01", 5, |_| (4, false));
        let err = full_moon_split(&records).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::EmptyPartition {
                subset: "full-moon days".to_string()
            }
        );
    }

    #[test]
    fn empty_baseline_side_is_an_error() {
        let records = vec![record("2024-01-25", 9, true)];
        let err = full_moon_split(&records).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyPartition { subset } if subset == "non-full-moon days"));
    }

    #[test]
    fn group_average_over_subset() {
        let records = vec![
            record("2024-01-01", 2, false),
            record("2024-01-02", 4, false),
            record("2024-01-03", 9, true),
        ];
        let stats = group_average(&records, |r| !r.is_full_moon, "baseline").unwrap();
        assert!((stats.average - 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.sample_size, 2);
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let records = vec![
            record("2024-01-01", u64::MAX, false),
            record("2024-01-02", u64::MAX, false),
        ];
        let stats = group_average(&records, |_| true, "all days").unwrap();
        assert_eq!(stats.sample_size, 2);
        assert!(stats.average.is_finite());
        assert!(stats.average > 0.0);
    }

    #[test]
    fn city_mean_requires_records() {
        let empty: Vec<DailyRecord> = Vec::new();
        assert!(city_mean_daily_count(&empty).is_err());
        let records = vec![record("2024-01-01", 3, false), record("2024-01-02", 6, true)];
        assert!((city_mean_daily_count(&records).unwrap() - 4.5).abs() < f64::EPSILON);
    }
}
