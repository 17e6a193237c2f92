//! Engine configuration.
//!
//! The fixed enumerations (age bands, price bands), rank thresholds, ranking
//! directions and pricing elasticities are supplied here at construction time
//! instead of being embedded in the filter or metrics logic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::competitor::{CompetitorId, CompetitorTable};
use crate::error::ConfigError;
use crate::facet::{AgeBand, PriceBand, ALL};
use crate::metrics::gap::GapConfig;
use crate::metrics::scenario::SimulationConfig;

/// Age bands and price bands offered by the filter menus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetConfig {
    /// Age bands in menu order.
    pub age_bands: Vec<AgeBand>,
    /// Price bands in ascending order.
    pub price_bands: Vec<PriceBand>,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            age_bands: ["6-10", "11-14", "15-18", "18+"]
                .into_iter()
                .map(AgeBand::from)
                .collect(),
            price_bands: vec![
                PriceBand::bounded("0-1000", 0.0, 1000.0),
                PriceBand::bounded("1000-2000", 1000.0, 2000.0),
                PriceBand::bounded("2000-3000", 2000.0, 3000.0),
                PriceBand::open("3000+", 3000.0),
            ],
        }
    }
}

impl FacetConfig {
    /// Returns the configured age band with this label.
    #[must_use]
    pub fn age_band(&self, label: &str) -> Option<&AgeBand> {
        self.age_bands.iter().find(|b| b.as_str() == label)
    }

    /// Returns the configured price band with this label.
    #[must_use]
    pub fn price_band(&self, label: &str) -> Option<&PriceBand> {
        self.price_bands.iter().find(|b| b.label == label)
    }

    /// Returns the price band `price` falls into, if any.
    #[must_use]
    pub fn band_for_price(&self, price: f64) -> Option<&PriceBand> {
        self.price_bands.iter().find(|b| b.contains(price))
    }

    /// Validate facet definitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidFacets { reason };

        if self.age_bands.is_empty() {
            return Err(invalid("at least one age band is required".to_string()));
        }
        let mut seen = HashSet::new();
        for band in &self.age_bands {
            let label = band.as_str().trim();
            if label.is_empty() || label == ALL {
                return Err(invalid(format!("age band label '{label}' is reserved or empty")));
            }
            if !seen.insert(label) {
                return Err(invalid(format!("duplicate age band '{label}'")));
            }
        }

        if self.price_bands.is_empty() {
            return Err(invalid("at least one price band is required".to_string()));
        }
        let mut seen = HashSet::new();
        let mut previous_max: Option<f64> = None;
        for (i, band) in self.price_bands.iter().enumerate() {
            let label = band.label.trim();
            if label.is_empty() || label == ALL {
                return Err(invalid(format!("price band label '{label}' is reserved or empty")));
            }
            if !seen.insert(label) {
                return Err(invalid(format!("duplicate price band '{label}'")));
            }
            if !band.min.is_finite() || band.min < 0.0 {
                return Err(invalid(format!("price band '{label}' has invalid min {}", band.min)));
            }
            match band.max {
                Some(max) if !max.is_finite() || max <= band.min => {
                    return Err(invalid(format!(
                        "price band '{label}' must satisfy min < max (got {} .. {max})",
                        band.min
                    )));
                }
                None if i + 1 != self.price_bands.len() => {
                    return Err(invalid(format!(
                        "only the last price band may be unbounded ('{label}' is not last)"
                    )));
                }
                _ => {}
            }
            if let Some(prev) = previous_max {
                if band.min < prev {
                    return Err(invalid(format!("price band '{label}' overlaps the previous band")));
                }
            }
            previous_max = band.max;
        }
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Filter menu enumerations.
    pub facets: FacetConfig,
    /// Gap severity thresholds and ranking directions.
    pub gap: GapConfig,
    /// Pricing simulator range, elasticities and add-ons.
    pub simulation: SimulationConfig,
    /// Competitors preselected in a fresh selection. When empty, the first
    /// `default_competitor_count` rivals in table order are used.
    pub default_competitors: Vec<CompetitorId>,
    /// Number of rivals preselected when `default_competitors` is empty.
    pub default_competitor_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            facets: FacetConfig::default(),
            gap: GapConfig::default(),
            simulation: SimulationConfig::default(),
            default_competitors: Vec::new(),
            default_competitor_count: 3,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// This must be called before constructing an [`Engine`](crate::Engine);
    /// `Engine::new` does so.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.facets.validate()?;
        self.gap.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    /// Checks the default competitor list against a loaded competitor table.
    pub fn validate_defaults(&self, competitors: &CompetitorTable) -> Result<(), ConfigError> {
        for id in &self.default_competitors {
            if !competitors.contains(id) {
                return Err(ConfigError::InvalidDefaults {
                    reason: format!("default competitor '{id}' is not in the snapshot"),
                });
            }
        }
        Ok(())
    }
}
