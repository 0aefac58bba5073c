//! Color scales.

use hotspot_map_scoring_models::AnalysisResult;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Rating of a suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreColor {
    /// Score of at least 70.
    Good,
    /// Score of at least 50.
    Moderate,
    /// Anything lower.
    Poor,
}

impl ScoreColor {
    /// Lowest score rated [`Self::Good`].
    pub const GOOD_THRESHOLD: f64 = 70.0;
    /// Lowest score rated [`Self::Moderate`].
    pub const MODERATE_THRESHOLD: f64 = 50.0;

    /// Rates a score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= Self::GOOD_THRESHOLD {
            Self::Good
        } else if score >= Self::MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Poor
        }
    }

    /// Fill color.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Good => "#1a9850",
            Self::Moderate => "#fdae61",
            Self::Poor => "#d73027",
        }
    }
}

/// Heatmap bucket over a normalized temperature, coolest first.
///
/// Buckets are narrower at the hot end, where differences matter more for
/// siting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TemperatureBucket {
    /// `[0, 0.25)`
    Cool,
    /// `[0.25, 0.5)`
    Mild,
    /// `[0.5, 0.65)`
    Medium,
    /// `[0.65, 0.8)`
    Warm,
    /// `[0.8, 1]`
    Hot,
}

impl TemperatureBucket {
    /// Lower bounds of `Mild`, `Medium`, `Warm` and `Hot`. Each bound
    /// belongs to the upper bucket.
    pub const BOUNDARIES: [f64; 4] = [0.25, 0.5, 0.65, 0.8];

    /// Maps a normalized value to its bucket. `NaN` maps to
    /// [`Self::Medium`].
    #[must_use]
    pub fn from_normalized(value: f64) -> Self {
        if value.is_nan() {
            return Self::Medium;
        }
        let [mild, medium, warm, hot] = Self::BOUNDARIES;
        if value < mild {
            Self::Cool
        } else if value < medium {
            Self::Mild
        } else if value < warm {
            Self::Medium
        } else if value < hot {
            Self::Warm
        } else {
            Self::Hot
        }
    }

    /// Position of the bucket, 0 (coolest) to 4 (hottest).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Fill color.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Cool => "#2c7bb6",
            Self::Mild => "#abd9e9",
            Self::Medium => "#ffffbf",
            Self::Warm => "#fdae61",
            Self::Hot => "#d7191c",
        }
    }
}

/// Min/max temperature across a result set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureScale {
    min: f64,
    max: f64,
}

impl TemperatureScale {
    /// Builds the scale from every result with a known mean temperature.
    ///
    /// Returns `None` when no result has one, in which case no heatmap is
    /// drawn.
    #[must_use]
    pub fn from_results(results: &[AnalysisResult]) -> Option<Self> {
        results
            .iter()
            .filter_map(AnalysisResult::mean_temp)
            .filter(|t| t.is_finite())
            .fold(None, |acc: Option<Self>, t| {
                Some(acc.map_or(Self { min: t, max: t }, |s| Self {
                    min: s.min.min(t),
                    max: s.max.max(t),
                }))
            })
    }

    /// Lowest temperature.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Highest temperature.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Maps `t` into `[0, 1]`. A uniform field normalizes to `0.5`.
    #[must_use]
    pub fn normalize(&self, t: f64) -> f64 {
        let span = self.max - self.min;
        if span <= f64::EPSILON {
            return 0.5;
        }
        ((t - self.min) / span).clamp(0.0, 1.0)
    }

    /// Bucket of temperature `t`.
    #[must_use]
    pub fn bucket(&self, t: f64) -> TemperatureBucket {
        TemperatureBucket::from_normalized(self.normalize(t))
    }
}

#[cfg(test)]
mod tests {
    use hotspot_map_scoring_models::PowerSummary;

    use super::*;

    fn with_temp(t: Option<f64>) -> AnalysisResult {
        AnalysisResult {
            lat: 0.0,
            lon: 0.0,
            score: 50.0,
            ndvi: 0.2,
            population: 2000,
            power_summary: PowerSummary {
                mean_temp: t,
                ..PowerSummary::default()
            },
            structure_type: None,
        }
    }

    #[test]
    fn bucket_boundaries_belong_to_upper_bucket() {
        let values = [0.0, 0.249, 0.25, 0.499, 0.5, 0.649, 0.65, 0.799, 0.8, 1.0];
        let buckets: Vec<usize> = values
            .iter()
            .map(|v| TemperatureBucket::from_normalized(*v).index())
            .collect();
        assert_eq!(buckets, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn score_thresholds() {
        assert_eq!(ScoreColor::from_score(100.0), ScoreColor::Good);
        assert_eq!(ScoreColor::from_score(70.0), ScoreColor::Good);
        assert_eq!(ScoreColor::from_score(69.99), ScoreColor::Moderate);
        assert_eq!(ScoreColor::from_score(50.0), ScoreColor::Moderate);
        assert_eq!(ScoreColor::from_score(49.99), ScoreColor::Poor);
        assert_eq!(ScoreColor::from_score(0.0), ScoreColor::Poor);
    }

    #[test]
    fn scale_skips_missing_temperatures() {
        let results = [with_temp(Some(10.0)), with_temp(None), with_temp(Some(30.0))];
        let scale = TemperatureScale::from_results(&results).unwrap();
        assert!((scale.min() - 10.0).abs() < f64::EPSILON);
        assert!((scale.max() - 30.0).abs() < f64::EPSILON);
        assert_eq!(scale.bucket(10.0), TemperatureBucket::Cool);
        assert_eq!(scale.bucket(20.0), TemperatureBucket::Medium);
        assert_eq!(scale.bucket(30.0), TemperatureBucket::Hot);
    }

    #[test]
    fn no_temperatures_means_no_scale() {
        assert!(TemperatureScale::from_results(&[with_temp(None), with_temp(None)]).is_none());
        assert!(TemperatureScale::from_results(&[]).is_none());
    }

    #[test]
    fn uniform_field_is_medium() {
        let results = [with_temp(Some(25.0)), with_temp(Some(25.0)), with_temp(Some(25.0))];
        let scale = TemperatureScale::from_results(&results).unwrap();
        assert!((scale.normalize(25.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(scale.bucket(25.0).index(), 2);
    }

    #[test]
    fn nan_is_medium() {
        assert_eq!(TemperatureBucket::from_normalized(f64::NAN), TemperatureBucket::Medium);
    }
}
