//! Selection state: the user's current facets and competitor set.
//!
//! A [`Selection`] is an immutable value. Every operation returns a new
//! selection, or an error that leaves the original untouched.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::competitor::{CompetitorId, CompetitorTable};
use crate::config::{EngineConfig, FacetConfig};
use crate::error::SelectionError;
use crate::facet::{AgeBand, Facet, PriceBand, ProgramType, ALL};
use crate::metrics::scenario::{ScenarioParams, SimulationConfig};

/// Current filter facets, selected competitors and optional pricing scenario.
///
/// Serializable for logging and display only. Selections are built through
/// [`Selection::initial`] and the validating `with_*` methods; UI events
/// arrive as [`SelectionChange`](crate::engine::SelectionChange) instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Selection {
    age: Facet<AgeBand>,
    program: Facet<ProgramType>,
    price: Facet<PriceBand>,
    selected: BTreeSet<CompetitorId>,
    scenario: Option<ScenarioParams>,
}

impl Selection {
    /// Fresh selection: every facet `All`, default competitors selected.
    ///
    /// Uses `config.default_competitors` when set, otherwise the first
    /// `default_competitor_count` rivals in table order. Unknown configured
    /// ids are skipped.
    #[must_use]
    pub fn initial(competitors: &CompetitorTable, config: &EngineConfig) -> Self {
        let selected = if config.default_competitors.is_empty() {
            competitors
                .rivals()
                .take(config.default_competitor_count)
                .map(|c| c.id.clone())
                .collect()
        } else {
            config
                .default_competitors
                .iter()
                .filter(|id| competitors.contains(id))
                .cloned()
                .collect()
        };
        Self {
            selected,
            ..Self::default()
        }
    }

    /// Age facet.
    #[must_use]
    pub const fn age(&self) -> &Facet<AgeBand> {
        &self.age
    }

    /// Program facet.
    #[must_use]
    pub const fn program(&self) -> &Facet<ProgramType> {
        &self.program
    }

    /// Price band facet.
    #[must_use]
    pub const fn price(&self) -> &Facet<PriceBand> {
        &self.price
    }

    /// Explicitly selected competitors (the reference is implicit).
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<CompetitorId> {
        &self.selected
    }

    /// Pricing scenario, if one is set.
    #[must_use]
    pub const fn scenario(&self) -> Option<&ScenarioParams> {
        self.scenario.as_ref()
    }

    /// Sets the age facet to `"all"` or one of the configured bands.
    pub fn with_age_filter(&self, value: &str, facets: &FacetConfig) -> Result<Self, SelectionError> {
        let age = if value == ALL {
            Facet::All
        } else {
            let band = facets
                .age_band(value)
                .ok_or_else(|| invalid("age", value))?;
            Facet::Only(band.clone())
        };
        Ok(Self {
            age,
            ..self.clone()
        })
    }

    /// Sets the program facet to `"all"` or a program type.
    pub fn with_program_filter(&self, value: &str) -> Result<Self, SelectionError> {
        let program = if value == ALL {
            Facet::All
        } else {
            let program: ProgramType = value.parse().map_err(|()| invalid("program", value))?;
            Facet::Only(program)
        };
        Ok(Self {
            program,
            ..self.clone()
        })
    }

    /// Sets the price facet to `"all"` or one of the configured band labels.
    pub fn with_price_filter(&self, value: &str, facets: &FacetConfig) -> Result<Self, SelectionError> {
        let price = if value == ALL {
            Facet::All
        } else {
            let band = facets
                .price_band(value)
                .ok_or_else(|| invalid("price", value))?;
            Facet::Only(band.clone())
        };
        Ok(Self {
            price,
            ..self.clone()
        })
    }

    /// Adds `id` to the selected set if absent, removes it if present.
    pub fn toggle_competitor(
        &self,
        id: &CompetitorId,
        competitors: &CompetitorTable,
    ) -> Result<Self, SelectionError> {
        if !competitors.contains(id) {
            return Err(SelectionError::UnknownCompetitor { id: id.to_string() });
        }
        let mut selected = self.selected.clone();
        if !selected.remove(id) {
            selected.insert(id.clone());
        }
        Ok(Self {
            selected,
            ..self.clone()
        })
    }

    /// Sets the pricing scenario after checking it against `config`.
    pub fn with_scenario(
        &self,
        params: ScenarioParams,
        config: &SimulationConfig,
    ) -> Result<Self, SelectionError> {
        let reject = |reason: String| SelectionError::InvalidScenario { reason };

        if params.destination.trim().is_empty() {
            return Err(reject("destination cannot be empty".to_string()));
        }
        if params.program.trim().is_empty() {
            return Err(reject("program cannot be empty".to_string()));
        }
        if !config.in_range(params.candidate_price) {
            return Err(reject(format!(
                "candidate price {} outside {} ..= {}",
                params.candidate_price, config.min_price, config.max_price
            )));
        }
        if let Some(unknown) = params.add_ons.iter().find(|id| config.add_on(id).is_none()) {
            return Err(reject(format!("unknown add-on '{unknown}'")));
        }
        Ok(Self {
            scenario: Some(params),
            ..self.clone()
        })
    }

    /// Clears the pricing scenario.
    #[must_use]
    pub fn without_scenario(&self) -> Self {
        Self {
            scenario: None,
            ..self.clone()
        }
    }

    /// Reference first, then selected competitors in table order.
    #[must_use]
    pub fn visible_competitors(&self, competitors: &CompetitorTable) -> Vec<CompetitorId> {
        let reference = competitors.reference();
        std::iter::once(reference.clone())
            .chain(
                competitors
                    .rivals()
                    .filter(|c| self.selected.contains(&c.id))
                    .map(|c| c.id.clone()),
            )
            .collect()
    }

    /// Visible competitors as a set, for projection.
    #[must_use]
    pub fn visible_set(&self, competitors: &CompetitorTable) -> BTreeSet<CompetitorId> {
        self.visible_competitors(competitors).into_iter().collect()
    }
}

fn invalid(facet: &'static str, value: &str) -> SelectionError {
    SelectionError::InvalidFilterValue {
        facet,
        value: value.to_string(),
    }
}
