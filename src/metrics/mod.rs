//! Metrics calculator.
//!
//! Derives every comparative number from a [`FilteredSubsets`]: percentage
//! differences against the reference brand, gap severities, the sentiment
//! summary and the pricing scenario. A metric that cannot be computed becomes
//! [`Metric::NotApplicable`] rather than NaN or infinity.

pub mod gap;
pub mod scenario;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::competitor::{CompetitorId, CompetitorValues};
use crate::error::MetricError;
use crate::filter::FilteredSubsets;
use crate::record::{Destination, PriceRecord};
use crate::selection::Selection;

use gap::{GapAssessment, GapConfig, MetricKind};
use scenario::{ScenarioOutcome, SimulationConfig};

/// A derived value, or an explicit marker that it is not applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric<T = f64> {
    /// Computed value.
    Value(T),
    /// Undefined for the current data.
    NotApplicable,
}

impl<T> Metric<T> {
    /// Absorbs a metric error into the not-applicable marker.
    pub fn from_result(result: Result<T, MetricError>) -> Self {
        result.map_or(Self::NotApplicable, Self::Value)
    }

    /// `None` becomes not applicable.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::NotApplicable, Self::Value)
    }

    /// The value, if applicable.
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable => None,
        }
    }

    /// Returns true if the metric is not applicable.
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }
}

/// Rounds to one decimal place, half away from zero.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage difference of `comparison` against `reference`, to one decimal.
///
/// `(comparison - reference) / reference * 100`. An absent, zero or
/// non-finite reference is undefined.
pub fn diff_pct(reference: Option<f64>, comparison: f64) -> Result<f64, MetricError> {
    let reference = reference
        .filter(|r| r.is_finite() && *r != 0.0)
        .ok_or(MetricError::UndefinedReference)?;
    let pct = (comparison - reference) / reference * 100.0;
    if pct.is_finite() {
        Ok(round1(pct))
    } else {
        Err(MetricError::UndefinedReference)
    }
}

/// Arithmetic mean, `None` for an empty input.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Derived numbers for one price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRowMetrics {
    /// Each visible rival's price against the reference price.
    pub competitor_diffs: CompetitorValues<Metric>,
    /// Mean visible rival price against the reference price.
    pub mean_diff: Metric,
    /// Reference brand's price rank among visible competitors.
    pub gap: Metric<GapAssessment>,
}

/// Sentiment and NPS roll-up for the reference brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Mean of the reference's category scores.
    pub reference_mean: Metric,
    /// Mean of every visible rival's present category scores.
    pub competitor_mean: Metric,
    /// Reference mean against competitor mean, in percent.
    pub reference_vs_competitors_pct: Metric,
    /// Reference brand's NPS.
    pub reference_nps: Metric,
    /// Mean NPS of the visible rivals.
    pub sector_nps: Metric,
    /// Reference's best-scoring category.
    pub strongest_category: Option<String>,
    /// Reference's worst-scoring category.
    pub weakest_category: Option<String>,
}

/// Every derived value for one selection, aligned index-for-index with the
/// corresponding collection in [`FilteredSubsets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Per destination, price against the reference's same destination.
    pub destination_diffs: Vec<Metric>,
    /// Per price record.
    pub price_rows: Vec<PriceRowMetrics>,
    /// Per sentiment category.
    pub sentiment_gaps: Vec<Metric<GapAssessment>>,
    /// Sentiment and NPS roll-up.
    pub sentiment_summary: SentimentSummary,
    /// Per radar axis.
    pub radar_gaps: Vec<Metric<GapAssessment>>,
    /// Per keyword.
    pub keyword_gaps: Vec<Metric<GapAssessment>>,
    /// Per digital metric, each rival against the reference.
    pub digital_diffs: Vec<CompetitorValues<Metric>>,
    /// `None` when the selection carries no scenario.
    pub scenario: Option<Metric<ScenarioOutcome>>,
}

/// Computes [`Metrics`] from filtered subsets.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsCalculator {
    gap: GapConfig,
    simulation: SimulationConfig,
}

impl MetricsCalculator {
    /// Creates a calculator from validated configuration.
    #[must_use]
    pub const fn new(gap: GapConfig, simulation: SimulationConfig) -> Self {
        Self { gap, simulation }
    }

    /// Gap configuration in use.
    #[must_use]
    pub const fn gap(&self) -> &GapConfig {
        &self.gap
    }

    /// Simulation configuration in use.
    #[must_use]
    pub const fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Derives all metrics for `subsets`.
    #[must_use]
    pub fn compute(&self, subsets: &FilteredSubsets, selection: &Selection) -> Metrics {
        let reference = &subsets.reference;

        let destination_diffs = subsets
            .destinations
            .iter()
            .map(|d| {
                let base = reference_destination(&subsets.destinations, reference, d);
                Metric::from_result(diff_pct(base, d.price))
            })
            .collect();

        let price_rows = subsets
            .prices
            .iter()
            .map(|p| self.price_row(p, reference))
            .collect();

        let sentiment_gaps = subsets
            .sentiment
            .iter()
            .map(|s| Metric::from_result(self.gap.assess(MetricKind::Sentiment, &s.scores, reference)))
            .collect();

        let radar_gaps = subsets
            .radar
            .iter()
            .map(|a| Metric::from_result(self.gap.assess(MetricKind::Score, &a.scores, reference)))
            .collect();

        let keyword_gaps = subsets
            .keywords
            .iter()
            .map(|k| {
                Metric::from_result(self.gap.assess(MetricKind::SearchPosition, &k.positions, reference))
            })
            .collect();

        let digital_diffs = subsets
            .digital
            .iter()
            .map(|m| rival_diffs(&m.values, reference))
            .collect();

        let scenario = selection.scenario().map(|params| {
            let baseline = subsets
                .scenario_prices
                .as_ref()
                .and_then(|p| p.prices.get(reference).copied());
            let rivals: Vec<f64> = subsets
                .scenario_prices
                .as_ref()
                .map(|p| {
                    p.prices
                        .iter()
                        .filter(|(id, _)| *id != reference)
                        .map(|(_, v)| *v)
                        .collect()
                })
                .unwrap_or_default();
            Metric::from_result(scenario::simulate(&self.simulation, params, baseline, &rivals))
        });

        let metrics = Metrics {
            destination_diffs,
            price_rows,
            sentiment_gaps,
            sentiment_summary: sentiment_summary(subsets),
            radar_gaps,
            keyword_gaps,
            digital_diffs,
            scenario,
        };
        debug!(
            destinations = metrics.destination_diffs.len(),
            price_rows = metrics.price_rows.len(),
            scenario = metrics.scenario.is_some(),
            "metrics computed"
        );
        metrics
    }

    fn price_row(&self, record: &PriceRecord, reference: &CompetitorId) -> PriceRowMetrics {
        let base = record.prices.get(reference).copied();
        let rival_mean = mean(
            record
                .prices
                .iter()
                .filter(|(id, _)| *id != reference)
                .map(|(_, v)| *v),
        );
        PriceRowMetrics {
            competitor_diffs: rival_diffs(&record.prices, reference),
            mean_diff: rival_mean.map_or(Metric::NotApplicable, |m| Metric::from_result(diff_pct(base, m))),
            gap: Metric::from_result(self.gap.assess(MetricKind::Price, &record.prices, reference)),
        }
    }
}

/// Reference brand's price for the same destination: same name and program
/// first, then same name only.
fn reference_destination(
    destinations: &[Destination],
    reference: &CompetitorId,
    row: &Destination,
) -> Option<f64> {
    let same_name = || {
        destinations
            .iter()
            .filter(|d| &d.competitor == reference && d.name == row.name)
    };
    same_name()
        .find(|d| d.program == row.program)
        .or_else(|| same_name().next())
        .map(|d| d.price)
}

/// Each rival's value against the reference value.
fn rival_diffs(values: &CompetitorValues<f64>, reference: &CompetitorId) -> CompetitorValues<Metric> {
    let base = values.get(reference).copied();
    values
        .iter()
        .filter(|(id, _)| *id != reference)
        .map(|(id, v)| (id.clone(), Metric::from_result(diff_pct(base, *v))))
        .collect()
}

fn sentiment_summary(subsets: &FilteredSubsets) -> SentimentSummary {
    let reference = &subsets.reference;

    let reference_scores: Vec<(&str, f64)> = subsets
        .sentiment
        .iter()
        .filter_map(|s| s.scores.get(reference).map(|v| (s.category.as_str(), *v)))
        .collect();
    let reference_mean = mean(reference_scores.iter().map(|(_, v)| *v));
    let competitor_mean = mean(subsets.sentiment.iter().flat_map(|s| {
        s.scores
            .iter()
            .filter(|(id, _)| *id != reference)
            .map(|(_, v)| *v)
    }));

    // First occurrence wins on ties.
    let mut strongest: Option<(&str, f64)> = None;
    let mut weakest: Option<(&str, f64)> = None;
    for &(category, score) in &reference_scores {
        if strongest.map_or(true, |(_, best)| score > best) {
            strongest = Some((category, score));
        }
        if weakest.map_or(true, |(_, worst)| score < worst) {
            weakest = Some((category, score));
        }
    }

    let reference_nps = subsets
        .nps
        .iter()
        .find(|n| &n.competitor == reference)
        .map(|n| n.score);
    let sector_nps = mean(
        subsets
            .nps
            .iter()
            .filter(|n| &n.competitor != reference)
            .map(|n| n.score),
    );

    SentimentSummary {
        reference_mean: Metric::from_option(reference_mean.map(round1)),
        competitor_mean: Metric::from_option(competitor_mean.map(round1)),
        reference_vs_competitors_pct: reference_mean.map_or(Metric::NotApplicable, |r| {
            Metric::from_result(diff_pct(competitor_mean, r))
        }),
        reference_nps: Metric::from_option(reference_nps),
        sector_nps: Metric::from_option(sector_nps.map(round1)),
        strongest_category: strongest.map(|(c, _)| c.to_string()),
        weakest_category: weakest.map(|(c, _)| c.to_string()),
    }
}
