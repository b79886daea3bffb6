//! Plain-text rendering of engine results.

use lunar_crime_analytics_models::{
    CityReport, CityStatistics, Computed, CrossCityComparison, MonthBucket, PhaseBucket,
    SyntheticHourlyProfile, WeekdayBucket,
};
use lunar_crime_lunar_models::CityId;

fn change(percent: Option<f64>) -> String {
    percent.map_or_else(|| "n/a".to_string(), |p| format!("{p:+.1}%"))
}

/// Prints `value` via `f`, or an "insufficient data" line.
fn section<T>(title: &str, value: &Computed<T>, f: impl FnOnce(&T)) {
    match value {
        Computed::Ready(value) => f(value),
        Computed::Unavailable { kind, message } => {
            println!("{title}: insufficient data ({kind}: {message})");
        }
    }
}

pub fn statistics(stats: &CityStatistics) {
    println!("{} ({})", stats.city.display_name(), stats.city);
    println!(
        "  Total incidents:    {} over {} day(s)",
        stats.total_incidents, stats.total_days
    );
    println!(
        "  Full-moon average:  {:.2} ({} day(s))",
        stats.full_moon.average, stats.full_moon.sample_size
    );
    println!(
        "  Baseline average:   {:.2} ({} day(s))",
        stats.non_full_moon.average, stats.non_full_moon.sample_size
    );
    println!(
        "  Effect:             {:+.2}% (ratio {:.3})",
        stats.effect_size.percent_difference, stats.effect_size.normalized_ratio
    );
    println!(
        "  p-value:            {:.4} ({})",
        stats.p_value,
        stats.significance.label()
    );
    println!(
        "  Correlation:        {:.3} ({})",
        stats.correlation, stats.correlation_strength
    );
}

pub fn monthly(buckets: &[MonthBucket]) {
    println!("  Month    Avg      FM avg   FM days  Days  Complete  Change");
    for b in buckets {
        let fm_avg = if b.has_full_moon_data {
            format!("{:.2}", b.full_moon_average)
        } else {
            "-".to_string()
        };
        println!(
            "  {}  {:<8.2} {:<8} {:<8} {:<5} {:<9.1} {}",
            b.month_key,
            b.average,
            fm_avg,
            b.full_moon_day_count,
            b.total_days,
            b.completeness * 100.0,
            change(b.full_moon_change_percent)
        );
    }
}

pub fn weekday(buckets: &[WeekdayBucket]) {
    println!("  Day        Avg      FM avg   FM days  Days  Change");
    for b in buckets {
        let fm_avg = if b.has_full_moon_data {
            format!("{:.2}", b.full_moon_average)
        } else {
            "-".to_string()
        };
        println!(
            "  {:<10} {:<8.2} {:<8} {:<8} {:<5} {}",
            b.day.as_ref(),
            b.average,
            fm_avg,
            b.full_moon_day_count,
            b.total_days,
            change(b.full_moon_change_percent)
        );
    }
}

pub fn hourly(profile: &SyntheticHourlyProfile) {
    println!("  [synthetic] {}", profile.note);
    println!("  Hour  Baseline   Full moon");
    for h in &profile.hours {
        println!(
            "  {:02}    {:<10.2} {:.2}",
            h.hour, h.baseline_rate, h.full_moon_rate
        );
    }
}

pub fn phases(buckets: &[PhaseBucket]) {
    println!("  Phase             Avg      Days");
    for b in buckets {
        println!("  {:<17} {:<8.2} {}", b.phase.as_ref(), b.average, b.total_days);
    }
}

fn city_list(cities: &[CityId]) -> String {
    let names: Vec<&str> = cities.iter().map(AsRef::as_ref).collect();
    names.join(", ")
}

pub fn comparison(cmp: &CrossCityComparison) {
    println!("Cross-city comparison ({})", city_list(&cmp.cities));
    println!("  Population factor:     {:.2}x", cmp.population_factor);
    match (cmp.max_normalized_ratio, cmp.max_ratio_city) {
        (Some(ratio), Some(city)) => println!("  Max normalized ratio:  {ratio:.3} ({city})"),
        _ => println!("  Max normalized ratio:  insufficient data"),
    }
    println!("  Effect consistency:    {:.2} pts", cmp.effect_consistency);
    println!(
        "  Combined significance: {:.2}% [{}]",
        cmp.combined_significance,
        city_list(&cmp.significant_cities)
    );
    if !cmp.missing_effect_cities.is_empty() {
        println!(
            "  No effect size for:    {}",
            city_list(&cmp.missing_effect_cities)
        );
    }
}

pub fn report(report: &CityReport) {
    if !report.statistics.is_ready() {
        let summary = &report.summary;
        println!("{} ({})", summary.city.display_name(), summary.city);
        println!(
            "  Total incidents:    {} over {} day(s)",
            summary.total_incidents, summary.total_days
        );
        println!(
            "  p-value:            {:.4} ({})",
            summary.p_value,
            summary.significance.label()
        );
    }
    section("Statistics", &report.statistics, statistics);
    println!("  Dataset fingerprint: {}", report.fingerprint);
    println!();
    println!("Monthly");
    section("Monthly", &report.monthly, |b| monthly(b));
    println!();
    println!("Weekday");
    section("Weekday", &report.weekday, |b| weekday(b));
    println!();
    println!("Hourly");
    section("Hourly", &report.hourly, hourly);
    println!();
    println!("Phases");
    section("Phases", &report.phases, |b| phases(b));
}
