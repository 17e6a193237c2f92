//! Competitive rank and gap severity.
//!
//! The reference brand's rank on a record is its position among all present
//! per-competitor values, sorted best-first. Which end is "best" depends on
//! the metric kind and is configured, not hard-coded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::competitor::{CompetitorId, CompetitorValues};
use crate::error::{ConfigError, MetricError};

/// Qualitative severity / impact / potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Which end of a value scale ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    /// Smaller values rank better (prices, search positions).
    LowerIsBetter,
    /// Larger values rank better (sentiment, scores).
    HigherIsBetter,
}

impl RankDirection {
    /// Returns true if `a` ranks strictly better than `b`.
    #[must_use]
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Self::LowerIsBetter => a < b,
            Self::HigherIsBetter => a > b,
        }
    }
}

/// Kind of value a gap is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Listed prices.
    Price,
    /// Search ranking positions.
    SearchPosition,
    /// Review sentiment shares.
    Sentiment,
    /// Radar scores.
    Score,
}

/// Rank thresholds: `rank <= low_max_rank` is Low, `rank <= medium_max_rank`
/// is Medium, anything worse is High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapThresholds {
    /// Worst rank still rated Low.
    pub low_max_rank: usize,
    /// Worst rank still rated Medium.
    pub medium_max_rank: usize,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            low_max_rank: 2,
            medium_max_rank: 4,
        }
    }
}

impl GapThresholds {
    /// Maps a 1-based rank to a severity.
    #[must_use]
    pub const fn classify(&self, rank: usize) -> Severity {
        if rank <= self.low_max_rank {
            Severity::Low
        } else if rank <= self.medium_max_rank {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Validate thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_max_rank == 0 {
            return Err(ConfigError::InvalidThresholds {
                reason: "low_max_rank must be >= 1".to_string(),
            });
        }
        if self.medium_max_rank <= self.low_max_rank {
            return Err(ConfigError::InvalidThresholds {
                reason: "medium_max_rank must be > low_max_rank".to_string(),
            });
        }
        Ok(())
    }
}

/// Gap configuration: thresholds plus ranking direction per metric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Rank to severity mapping.
    pub thresholds: GapThresholds,
    /// Direction for prices.
    pub price: RankDirection,
    /// Direction for search positions.
    pub search_position: RankDirection,
    /// Direction for sentiment shares.
    pub sentiment: RankDirection,
    /// Direction for radar scores.
    pub score: RankDirection,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            thresholds: GapThresholds::default(),
            price: RankDirection::LowerIsBetter,
            search_position: RankDirection::LowerIsBetter,
            sentiment: RankDirection::HigherIsBetter,
            score: RankDirection::HigherIsBetter,
        }
    }
}

impl GapConfig {
    /// Ranking direction configured for `kind`.
    #[must_use]
    pub const fn direction(&self, kind: MetricKind) -> RankDirection {
        match kind {
            MetricKind::Price => self.price,
            MetricKind::SearchPosition => self.search_position,
            MetricKind::Sentiment => self.sentiment,
            MetricKind::Score => self.score,
        }
    }

    /// Validate gap configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()
    }

    /// Ranks the reference on `values` and classifies the result.
    pub fn assess<T: Copy + Into<f64>>(
        &self,
        kind: MetricKind,
        values: &CompetitorValues<T>,
        reference: &CompetitorId,
    ) -> Result<GapAssessment, MetricError> {
        let rank = rank_of_reference(values, reference, self.direction(kind))?;
        Ok(GapAssessment {
            rank,
            out_of: values.len(),
            severity: self.thresholds.classify(rank),
        })
    }
}

/// Rank of the reference and the resulting severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapAssessment {
    /// 1-based rank of the reference.
    pub rank: usize,
    /// Number of competitors with a value, reference included.
    pub out_of: usize,
    /// Severity of the rank.
    pub severity: Severity,
}

/// 1-based rank of the reference among the present values.
///
/// Rank is one plus the number of values strictly better than the
/// reference's, so ties share the better rank.
pub fn rank_of_reference<T: Copy + Into<f64>>(
    values: &CompetitorValues<T>,
    reference: &CompetitorId,
    direction: RankDirection,
) -> Result<usize, MetricError> {
    let own: f64 = values
        .get(reference)
        .copied()
        .map(Into::into)
        .ok_or(MetricError::UndefinedReference)?;
    if !own.is_finite() {
        return Err(MetricError::UndefinedReference);
    }
    let ahead = values
        .iter()
        .filter(|(id, _)| *id != reference)
        .filter(|(_, v)| direction.better((**v).into(), own))
        .count();
    Ok(ahead + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> CompetitorId {
        CompetitorId::new("ref")
    }

    #[test]
    fn thresholds_map_ranks() {
        let t = GapThresholds::default();
        assert_eq!(t.classify(1), Severity::Low);
        assert_eq!(t.classify(2), Severity::Low);
        assert_eq!(t.classify(3), Severity::Medium);
        assert_eq!(t.classify(4), Severity::Medium);
        assert_eq!(t.classify(5), Severity::High);
        assert_eq!(t.classify(9), Severity::High);
    }

    #[test]
    fn thresholds_validation() {
        GapThresholds::default().validate().unwrap();
        assert!(GapThresholds { low_max_rank: 0, medium_max_rank: 3 }.validate().is_err());
        assert!(GapThresholds { low_max_rank: 3, medium_max_rank: 3 }.validate().is_err());
    }

    #[test]
    fn price_rank_is_ascending() {
        let prices = CompetitorValues::new()
            .with("ref", 2290.0)
            .with("ef", 2450.0)
            .with("inter", 2320.0)
            .with("language", 2190.0);
        let rank = rank_of_reference(&prices, &reference(), RankDirection::LowerIsBetter).unwrap();
        assert_eq!(rank, 2);
    }

    #[test]
    fn sentiment_rank_is_descending() {
        let scores = CompetitorValues::new()
            .with("ref", 81.0)
            .with("ef", 72.0)
            .with("inter", 83.0)
            .with("iter", 85.0);
        let rank = rank_of_reference(&scores, &reference(), RankDirection::HigherIsBetter).unwrap();
        assert_eq!(rank, 3);
    }

    #[test]
    fn ties_share_the_better_rank() {
        let scores = CompetitorValues::new().with("ref", 80.0).with("ef", 80.0);
        let rank = rank_of_reference(&scores, &reference(), RankDirection::HigherIsBetter).unwrap();
        assert_eq!(rank, 1);
    }

    #[test]
    fn missing_reference_is_undefined() {
        let scores = CompetitorValues::new().with("ef", 80.0);
        assert_eq!(
            rank_of_reference(&scores, &reference(), RankDirection::HigherIsBetter),
            Err(MetricError::UndefinedReference)
        );
    }

    #[test]
    fn search_position_assessment() {
        let gap = GapConfig::default();
        let positions = CompetitorValues::new()
            .with("ref", 6u32)
            .with("ef", 1u32)
            .with("inter", 2u32);
        let a = gap.assess(MetricKind::SearchPosition, &positions, &reference()).unwrap();
        assert_eq!(a.rank, 3);
        assert_eq!(a.out_of, 3);
        assert_eq!(a.severity, Severity::Medium);
    }
}
