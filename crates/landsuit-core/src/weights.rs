//! Validation of the slope/aspect weighting pair.
use crate::error::{Result, SuitabilityError, WeightKind};

/// Slope and aspect weights, validated to lie in [0, 1] and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub slope: f64,
    pub aspect: f64,
}

impl Weights {
    pub fn new(slope: f64, aspect: f64) -> Result<Self> {
        validate(slope, aspect)?;
        Ok(Self { slope, aspect })
    }

    /// Parse both weights from parameter text, then validate them.
    pub fn parse(slope: &str, aspect: &str) -> Result<Self> {
        let slope = parse_weight(WeightKind::Slope, slope)?;
        let aspect = parse_weight(WeightKind::Aspect, aspect)?;
        Self::new(slope, aspect)
    }
}

fn parse_weight(weight: WeightKind, input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| SuitabilityError::WeightParse {
            weight,
            input: input.to_string(),
        })
}

fn check_range(weight: WeightKind, value: f64) -> Result<()> {
    // NaN fails both comparisons and is reported as out of range.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SuitabilityError::WeightRange { weight, value })
    }
}

/// Slope weight is checked first, then aspect, then the sum.
///
/// The sum must equal 1.0 exactly; there is no tolerance, so a pair that is
/// off by one unit in the last place is rejected.
pub fn validate(slope: f64, aspect: f64) -> Result<()> {
    check_range(WeightKind::Slope, slope)?;
    check_range(WeightKind::Aspect, aspect)?;
    if slope + aspect != 1.0 {
        return Err(SuitabilityError::WeightSum { slope, aspect });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pairs_summing_to_one() {
        for (a, b) in [(0.0, 1.0), (1.0, 0.0), (0.5, 0.5), (0.4, 0.6), (0.25, 0.75)] {
            assert!(validate(a, b).is_ok(), "{a} + {b} should validate");
        }
    }

    #[test]
    fn out_of_range_reports_which_weight() {
        assert!(matches!(
            validate(-0.1, 1.1),
            Err(SuitabilityError::WeightRange { weight: WeightKind::Slope, .. })
        ));
        assert!(matches!(
            validate(0.5, 1.5),
            Err(SuitabilityError::WeightRange { weight: WeightKind::Aspect, value }) if value == 1.5
        ));
        assert!(matches!(
            validate(f64::NAN, 0.5),
            Err(SuitabilityError::WeightRange { weight: WeightKind::Slope, .. })
        ));
    }

    #[test]
    fn in_range_but_wrong_sum() {
        assert!(matches!(
            validate(0.3, 0.3),
            Err(SuitabilityError::WeightSum { slope, aspect }) if slope == 0.3 && aspect == 0.3
        ));
    }

    #[test]
    fn exact_sum_has_no_tolerance() {
        assert!(validate(0.1, 0.9).is_ok());
        assert!(matches!(
            validate(0.5, 0.4999999),
            Err(SuitabilityError::WeightSum { .. })
        ));
        assert!(matches!(
            validate(0.5, 0.5 - 1e-12),
            Err(SuitabilityError::WeightSum { .. })
        ));
    }

    #[test]
    fn parse_trims_and_rejects_non_numbers() {
        let w = Weights::parse(" 0.4", "0.6 ").unwrap();
        assert_eq!(w, Weights { slope: 0.4, aspect: 0.6 });
        assert!(matches!(
            Weights::parse("0.4", "sixty"),
            Err(SuitabilityError::WeightParse { weight: WeightKind::Aspect, .. })
        ));
    }
}
