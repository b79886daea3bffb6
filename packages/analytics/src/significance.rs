//! Significance labels and correlation bands.
//!
//! The threshold is a fixed 0.05 applied to each city independently. No
//! multiple-comparison correction is made across the three cities.

use lunar_crime_analytics_models::{CorrelationStrength, Significance};

/// p-values strictly below this are labeled significant.
pub const P_VALUE_THRESHOLD: f64 = 0.05;

/// `|r|` below this is a weak correlation.
pub const WEAK_CORRELATION_LIMIT: f64 = 0.1;

/// `|r|` below this (and at least [`WEAK_CORRELATION_LIMIT`]) is moderate.
pub const MODERATE_CORRELATION_LIMIT: f64 = 0.3;

/// Labels a p-value.
#[must_use]
pub fn classify_significance(p_value: f64) -> Significance {
    if p_value < P_VALUE_THRESHOLD {
        Significance::Significant
    } else {
        Significance::NotSignificant
    }
}

/// Bands the magnitude of a correlation coefficient.
#[must_use]
pub fn correlation_strength(correlation: f64) -> CorrelationStrength {
    let magnitude = correlation.abs();
    if magnitude < WEAK_CORRELATION_LIMIT {
        CorrelationStrength::Weak
    } else if magnitude < MODERATE_CORRELATION_LIMIT {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(classify_significance(0.049_999), Significance::Significant);
        assert_eq!(classify_significance(0.05), Significance::NotSignificant);
        assert_eq!(classify_significance(0.0), Significance::Significant);
        assert_eq!(classify_significance(0.8), Significance::NotSignificant);
    }

    #[test]
    fn correlation_bands() {
        assert_eq!(correlation_strength(0.0), CorrelationStrength::Weak);
        assert_eq!(correlation_strength(0.099), CorrelationStrength::Weak);
        assert_eq!(correlation_strength(0.1), CorrelationStrength::Moderate);
        assert_eq!(correlation_strength(0.299), CorrelationStrength::Moderate);
        assert_eq!(correlation_strength(0.3), CorrelationStrength::Strong);
        assert_eq!(correlation_strength(0.95), CorrelationStrength::Strong);
    }

    #[test]
    fn negative_correlations_use_magnitude() {
        assert_eq!(correlation_strength(-0.05), CorrelationStrength::Weak);
        assert_eq!(correlation_strength(-0.2), CorrelationStrength::Moderate);
        assert_eq!(correlation_strength(-0.6), CorrelationStrength::Strong);
    }
}
