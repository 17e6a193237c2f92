//! Pricing what-if simulation.
//!
//! A deterministic, explainable model: the relative price change against the
//! baseline moves three indices (baseline = 100) linearly by configured
//! elasticities. Volume falls as price rises; revenue and margin rise.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MetricError};
use crate::metrics::{diff_pct, mean, round1, Metric};

/// Elasticity constants of the pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elasticities {
    /// Volume index points lost per unit of relative price increase.
    pub volume: f64,
    /// Revenue index points gained per unit of relative price increase.
    pub revenue: f64,
    /// Margin index points gained per unit of relative price increase.
    pub margin: f64,
}

impl Default for Elasticities {
    fn default() -> Self {
        Self {
            volume: 1.6,
            revenue: 1.0,
            margin: 2.4,
        }
    }
}

/// A premium service that can be bundled on top of the candidate price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    /// Id used in [`ScenarioParams::add_ons`].
    pub id: String,
    /// Display label.
    pub label: String,
    /// Added to the candidate price.
    pub price: f64,
}

impl AddOn {
    /// Creates an add-on.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            price,
        }
    }
}

/// Pricing simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lowest candidate price accepted.
    pub min_price: f64,
    /// Highest candidate price accepted.
    pub max_price: f64,
    /// Pricing model constants.
    pub elasticities: Elasticities,
    /// Add-ons offered by the simulator.
    pub add_ons: Vec<AddOn>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_price: 1800.0,
            max_price: 2700.0,
            elasticities: Elasticities::default(),
            add_ons: vec![
                AddOn::new("insurance", "Premium travel insurance", 90.0),
                AddOn::new("activities", "Extra activities", 120.0),
                AddOn::new("wellbeing", "Psychological support", 70.0),
            ],
        }
    }
}

impl SimulationConfig {
    /// Returns the add-on with this id.
    #[must_use]
    pub fn add_on(&self, id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.id == id)
    }

    /// Returns true if `price` is within the simulation range.
    #[must_use]
    pub fn in_range(&self, price: f64) -> bool {
        price.is_finite() && price >= self.min_price && price <= self.max_price
    }

    /// Validate simulator configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidSimulation { reason };

        if !self.min_price.is_finite() || !self.max_price.is_finite() {
            return Err(invalid("price range must be finite".to_string()));
        }
        if self.min_price < 0.0 || self.min_price > self.max_price {
            return Err(invalid(format!(
                "price range must satisfy 0 <= min <= max (got {} .. {})",
                self.min_price, self.max_price
            )));
        }
        let e = &self.elasticities;
        for (name, value) in [("volume", e.volume), ("revenue", e.revenue), ("margin", e.margin)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} elasticity must be finite and >= 0")));
            }
        }
        let mut seen = HashSet::new();
        for add_on in &self.add_ons {
            if add_on.id.trim().is_empty() {
                return Err(invalid("add-on id cannot be empty".to_string()));
            }
            if !seen.insert(add_on.id.as_str()) {
                return Err(invalid(format!("duplicate add-on '{}'", add_on.id)));
            }
            if !add_on.price.is_finite() || add_on.price < 0.0 {
                return Err(invalid(format!("add-on '{}' has invalid price", add_on.id)));
            }
        }
        Ok(())
    }
}

/// Inputs of the pricing simulator, part of the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Destination key matching a price record.
    pub destination: String,
    /// Program label (e.g. "Explorer" or "study"). When it names a program
    /// type, a price record of that program is preferred for the lookup.
    pub program: String,
    /// Candidate base price.
    pub candidate_price: f64,
    /// Ids of the add-ons toggled on.
    #[serde(default)]
    pub add_ons: BTreeSet<String>,
}

impl ScenarioParams {
    /// Creates scenario parameters with no add-ons.
    #[must_use]
    pub fn new(destination: impl Into<String>, program: impl Into<String>, candidate_price: f64) -> Self {
        Self {
            destination: destination.into(),
            program: program.into(),
            candidate_price,
            add_ons: BTreeSet::new(),
        }
    }

    /// Builder-style add-on toggle.
    #[must_use]
    pub fn with_add_on(mut self, id: impl Into<String>) -> Self {
        self.add_ons.insert(id.into());
        self
    }
}

/// Simulated impact of a scenario. Indices are relative to baseline = 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Reference brand's current price for the destination.
    pub baseline_price: f64,
    /// Candidate plus selected add-ons.
    pub final_price: f64,
    /// Mean price of the visible competitors serving the destination.
    pub competitor_average: Metric,
    /// Final price vs competitor average, in percent.
    pub vs_competition_pct: Metric,
    /// Final price vs baseline, in percent.
    pub price_change_pct: f64,
    /// Expected booking volume.
    pub volume_index: f64,
    /// Expected revenue.
    pub revenue_index: f64,
    /// Expected margin.
    pub margin_index: f64,
}

fn index(elasticity: f64, delta: f64) -> f64 {
    round1((100.0 * (1.0 + elasticity * delta)).max(0.0))
}

/// Runs the pricing model.
///
/// `baseline` must be present and non-zero; `competitor_prices` may be empty,
/// in which case the competition comparison is not applicable.
pub fn simulate(
    config: &SimulationConfig,
    params: &ScenarioParams,
    baseline: Option<f64>,
    competitor_prices: &[f64],
) -> Result<ScenarioOutcome, MetricError> {
    let baseline = baseline
        .filter(|b| b.is_finite() && *b != 0.0)
        .ok_or(MetricError::UndefinedReference)?;

    let add_on_total: f64 = params
        .add_ons
        .iter()
        .filter_map(|id| config.add_on(id))
        .map(|a| a.price)
        .sum();
    let final_price = params.candidate_price + add_on_total;
    let delta = (final_price - baseline) / baseline;

    let competitor_average = mean(competitor_prices.iter().copied());
    let vs_competition_pct = Metric::from_result(diff_pct(competitor_average, final_price));

    let e = &config.elasticities;
    Ok(ScenarioOutcome {
        baseline_price: baseline,
        final_price,
        competitor_average: Metric::from_option(competitor_average.map(round1)),
        vs_competition_pct,
        price_change_pct: round1(delta * 100.0),
        volume_index: index(-e.volume, delta),
        revenue_index: index(e.revenue, delta),
        margin_index: index(e.margin, delta),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn config_rejects_inverted_range_and_negative_elasticity() {
        let mut c = SimulationConfig::default();
        c.min_price = 3000.0;
        assert!(c.validate().is_err());

        let mut c = SimulationConfig::default();
        c.elasticities.volume = -1.0;
        assert!(c.validate().is_err());

        let mut c = SimulationConfig::default();
        c.add_ons.push(AddOn::new("insurance", "dup", 10.0));
        assert!(c.validate().is_err());
    }

    #[test]
    fn unchanged_price_keeps_indices_at_baseline() {
        let config = SimulationConfig::default();
        let params = ScenarioParams::new("Londra (UK)", "Explorer", 2290.0);
        let out = simulate(&config, &params, Some(2290.0), &[2450.0, 2320.0]).unwrap();
        assert_eq!(out.volume_index, 100.0);
        assert_eq!(out.revenue_index, 100.0);
        assert_eq!(out.margin_index, 100.0);
        assert_eq!(out.price_change_pct, 0.0);
    }

    #[test]
    fn price_increase_moves_indices_in_documented_directions() {
        let config = SimulationConfig::default();
        let params = ScenarioParams::new("Londra (UK)", "Explorer", 2290.0).with_add_on("activities");
        let out = simulate(&config, &params, Some(2290.0), &[2150.0]).unwrap();
        assert_eq!(out.final_price, 2410.0);
        assert!(out.volume_index < 100.0);
        assert!(out.revenue_index > 100.0);
        assert!(out.margin_index > out.revenue_index);
        // (2410 - 2150) / 2150 * 100 = 12.09...
        assert_eq!(out.vs_competition_pct, Metric::Value(12.1));
    }

    #[test]
    fn indices_are_monotonic_in_price() {
        let config = SimulationConfig::default();
        let mut last: Option<ScenarioOutcome> = None;
        for price in [1800.0, 2000.0, 2290.0, 2500.0, 2700.0] {
            let params = ScenarioParams::new("Dublino", "Discovery", price);
            let out = simulate(&config, &params, Some(2290.0), &[]).unwrap();
            if let Some(prev) = &last {
                assert!(out.volume_index <= prev.volume_index);
                assert!(out.revenue_index >= prev.revenue_index);
                assert!(out.margin_index >= prev.margin_index);
            }
            last = Some(out);
        }
    }

    #[test]
    fn missing_or_zero_baseline_is_undefined() {
        let config = SimulationConfig::default();
        let params = ScenarioParams::new("Tokyo", "Explorer", 2000.0);
        assert_eq!(
            simulate(&config, &params, None, &[]),
            Err(MetricError::UndefinedReference)
        );
        assert_eq!(
            simulate(&config, &params, Some(0.0), &[]),
            Err(MetricError::UndefinedReference)
        );
    }

    #[test]
    fn no_competitors_makes_comparison_not_applicable() {
        let config = SimulationConfig::default();
        let params = ScenarioParams::new("Toronto", "18+", 2200.0);
        let out = simulate(&config, &params, Some(2200.0), &[]).unwrap();
        assert_eq!(out.competitor_average, Metric::NotApplicable);
        assert_eq!(out.vs_competition_pct, Metric::NotApplicable);
    }
}
