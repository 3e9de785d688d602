use serde::Serialize;

/// Raw cut points on the 0–255 scaled risk raster. Values come from the
/// published classification of the county dataset and are intentionally
/// not derived from the display scale in [symbology](super::symbology).
pub const LOW_BELOW: f32 = 172.0;
pub const MODERATE_BELOW: f32 = 205.0;
pub const HIGH_BELOW: f32 = 237.0;

/// Risk class for a single raster sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskCategory {
    #[serde(rename = "No Data")]
    NoData,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::NoData => "No Data",
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
            RiskCategory::VeryHigh => "Very High",
        }
    }
}

/// Classify one raster sample into a risk class.
///
/// Total on its input: an absent or NaN sample is `NoData`, everything else
/// lands in exactly one class. Out-of-range values fall into the end
/// classes rather than erroring.
pub fn classify(value: Option<f32>) -> RiskCategory {
    let v = match value {
        Some(v) if !v.is_nan() => v,
        _ => return RiskCategory::NoData,
    };

    if v < LOW_BELOW {
        RiskCategory::Low
    } else if v < MODERATE_BELOW {
        RiskCategory::Moderate
    } else if v < HIGH_BELOW {
        RiskCategory::High
    } else {
        RiskCategory::VeryHigh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn absent_and_nan_are_no_data() {
        assert_eq!(classify(None), RiskCategory::NoData);
        assert_eq!(classify(Some(f32::NAN)), RiskCategory::NoData);
    }

    #[test]
    fn cut_points_are_half_open() {
        assert_eq!(classify(Some(171.999)), RiskCategory::Low);
        assert_eq!(classify(Some(172.0)), RiskCategory::Moderate);
        assert_eq!(classify(Some(204.999)), RiskCategory::Moderate);
        assert_eq!(classify(Some(205.0)), RiskCategory::High);
        assert_eq!(classify(Some(236.999)), RiskCategory::High);
        assert_eq!(classify(Some(237.0)), RiskCategory::VeryHigh);
        assert_eq!(classify(Some(255.0)), RiskCategory::VeryHigh);
    }

    #[test]
    fn out_of_range_values_land_in_end_classes() {
        assert_eq!(classify(Some(-40.0)), RiskCategory::Low);
        assert_eq!(classify(Some(0.0)), RiskCategory::Low);
        assert_eq!(classify(Some(10_000.0)), RiskCategory::VeryHigh);
    }

    // 1000 random samples across (and beyond) the raster range: every value
    // classifies into the band its cut points describe, and a second call
    // agrees with the first.
    #[test]
    fn random_samples_match_band_definition() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v: f32 = rng.random_range(-50.0..300.0);
            let got = classify(Some(v));
            let want = if v < 172.0 {
                RiskCategory::Low
            } else if v < 205.0 {
                RiskCategory::Moderate
            } else if v < 237.0 {
                RiskCategory::High
            } else {
                RiskCategory::VeryHigh
            };
            assert_eq!(got, want, "wrong class for {}", v);
            assert_eq!(got, classify(Some(v)), "classify not idempotent at {}", v);
        }
    }

    #[test]
    fn serializes_with_display_labels() {
        let json = serde_json::to_string(&RiskCategory::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        let json = serde_json::to_string(&RiskCategory::NoData).unwrap();
        assert_eq!(json, "\"No Data\"");
    }
}
