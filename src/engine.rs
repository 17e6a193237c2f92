//! Query engine and interactive session.
//!
//! [`Engine`] is the query interface: it owns a shared, read-only
//! [`RecordStore`] plus validated configuration and turns a [`Selection`] into
//! a [`ViewModel`] by running filter, metrics and view in sequence.
//!
//! [`Session`] is the stateful wrapper a presentation layer holds. It applies
//! one [`SelectionChange`] at a time and reports whether the view changed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::competitor::{CompetitorId, CompetitorTable};
use crate::config::EngineConfig;
use crate::error::{ConfigError, IntelResult, SelectionError};
use crate::filter::{self, FilteredSubsets};
use crate::metrics::scenario::ScenarioParams;
use crate::metrics::{Metrics, MetricsCalculator};
use crate::selection::Selection;
use crate::store::RecordStore;
use crate::view::{self, ViewModel, ViewRequest};

/// Stateless query engine over one record snapshot.
#[derive(Debug, Clone)]
pub struct Engine {
    store: Arc<RecordStore>,
    config: EngineConfig,
    calculator: MetricsCalculator,
}

impl Engine {
    /// Create an engine over `store`.
    ///
    /// Fails if the configuration is invalid or names default competitors
    /// the store does not know.
    pub fn new(store: impl Into<Arc<RecordStore>>, config: EngineConfig) -> Result<Self, ConfigError> {
        let store = store.into();
        config.validate()?;
        config.validate_defaults(store.competitors())?;
        let calculator = MetricsCalculator::new(config.gap, config.simulation.clone());
        info!(
            reference = %store.reference(),
            competitors = store.competitors().len(),
            age_bands = config.facets.age_bands.len(),
            price_bands = config.facets.price_bands.len(),
            "engine ready"
        );
        Ok(Self {
            store,
            config,
            calculator,
        })
    }

    /// Loads a JSON record snapshot and creates an engine over it.
    ///
    /// The snapshot is validated against `config.facets`.
    pub fn from_json(records: &str, config: EngineConfig) -> IntelResult<Self> {
        config.validate()?;
        let store = RecordStore::from_json(records, &config.facets)?;
        Ok(Self::new(store, config)?)
    }

    /// The record snapshot.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Shared handle to the record snapshot.
    #[must_use]
    pub fn shared_store(&self) -> Arc<RecordStore> {
        Arc::clone(&self.store)
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The competitor lookup table.
    #[must_use]
    pub fn competitors(&self) -> &CompetitorTable {
        self.store.competitors()
    }

    /// Fresh selection with configured defaults.
    #[must_use]
    pub fn initial_selection(&self) -> Selection {
        Selection::initial(self.store.competitors(), &self.config)
    }

    /// Filtered records for `selection`.
    #[must_use]
    pub fn filter(&self, selection: &Selection) -> FilteredSubsets {
        filter::apply(&self.store, selection)
    }

    /// Filtered records and their derived metrics.
    #[must_use]
    pub fn evaluate(&self, selection: &Selection) -> (FilteredSubsets, Metrics) {
        let subsets = self.filter(selection);
        let metrics = self.calculator.compute(&subsets, selection);
        (subsets, metrics)
    }

    /// Builds the full view for `selection`.
    #[must_use]
    pub fn apply_filters(&self, selection: &Selection) -> ViewModel {
        self.apply_filters_for(selection, &ViewRequest::all())
    }

    /// Builds only the surfaces in `request`.
    #[must_use]
    pub fn apply_filters_for(&self, selection: &Selection, request: &ViewRequest) -> ViewModel {
        let (subsets, metrics) = self.evaluate(selection);
        view::build_with(self.store.competitors(), &subsets, &metrics, selection, request)
    }

    /// See [`Selection::with_age_filter`].
    pub fn set_age_filter(&self, selection: &Selection, value: &str) -> Result<Selection, SelectionError> {
        selection.with_age_filter(value, &self.config.facets)
    }

    /// See [`Selection::with_program_filter`].
    pub fn set_program_filter(
        &self,
        selection: &Selection,
        value: &str,
    ) -> Result<Selection, SelectionError> {
        selection.with_program_filter(value)
    }

    /// See [`Selection::with_price_filter`].
    pub fn set_price_filter(&self, selection: &Selection, value: &str) -> Result<Selection, SelectionError> {
        selection.with_price_filter(value, &self.config.facets)
    }

    /// See [`Selection::toggle_competitor`].
    pub fn toggle_competitor(&self, selection: &Selection, id: &str) -> Result<Selection, SelectionError> {
        selection.toggle_competitor(&CompetitorId::new(id), self.store.competitors())
    }

    /// See [`Selection::with_scenario`].
    pub fn set_scenario(
        &self,
        selection: &Selection,
        params: ScenarioParams,
    ) -> Result<Selection, SelectionError> {
        selection.with_scenario(params, &self.config.simulation)
    }

    /// Applies one change to `selection`.
    pub fn apply_change(
        &self,
        selection: &Selection,
        change: SelectionChange,
    ) -> Result<Selection, SelectionError> {
        match change {
            SelectionChange::SetAgeFilter { value } => self.set_age_filter(selection, &value),
            SelectionChange::SetProgramFilter { value } => self.set_program_filter(selection, &value),
            SelectionChange::SetPriceFilter { value } => self.set_price_filter(selection, &value),
            SelectionChange::ToggleCompetitor { id } => self.toggle_competitor(selection, &id),
            SelectionChange::SetScenario { params } => self.set_scenario(selection, params),
            SelectionChange::ClearScenario => Ok(selection.without_scenario()),
            SelectionChange::Reset => Ok(self.initial_selection()),
        }
    }
}

/// A user action on the selection, as emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionChange {
    /// Set the age facet (`"all"` or a band label).
    SetAgeFilter { value: String },
    /// Set the program facet (`"all"` or a program type).
    SetProgramFilter { value: String },
    /// Set the price facet (`"all"` or a band label).
    SetPriceFilter { value: String },
    /// Add or remove a competitor.
    ToggleCompetitor { id: String },
    /// Set the pricing scenario.
    SetScenario { params: ScenarioParams },
    /// Drop the pricing scenario.
    ClearScenario,
    /// Back to the initial selection.
    Reset,
}

/// Result of a successful [`Session::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewUpdate<'a> {
    /// The recomputed view.
    pub view: &'a ViewModel,
    /// False when the new view is identical to the previous one.
    pub changed: bool,
}

/// Current selection and last view for one user.
#[derive(Debug, Clone)]
pub struct Session {
    engine: Engine,
    request: ViewRequest,
    selection: Selection,
    view: ViewModel,
    fingerprint: [u8; 32],
}

impl Session {
    /// Starts a session at the engine's initial selection.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self::with_request(engine, ViewRequest::all())
    }

    /// Starts a session that only builds the surfaces in `request`.
    #[must_use]
    pub fn with_request(engine: Engine, request: ViewRequest) -> Self {
        let selection = engine.initial_selection();
        let view = engine.apply_filters_for(&selection, &request);
        let fingerprint = view.fingerprint();
        Self {
            engine,
            request,
            selection,
            view,
            fingerprint,
        }
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Last computed view.
    #[must_use]
    pub const fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Applies `change` and recomputes the view.
    ///
    /// A rejected change returns the error and leaves selection and view
    /// untouched.
    pub fn dispatch(&mut self, change: SelectionChange) -> Result<ViewUpdate<'_>, SelectionError> {
        let next = match self.engine.apply_change(&self.selection, change.clone()) {
            Ok(next) => next,
            Err(e) => {
                warn!(change = ?change, error = %e, "selection change rejected");
                return Err(e);
            }
        };
        let view = self.engine.apply_filters_for(&next, &self.request);
        let fingerprint = view.fingerprint();
        let changed = fingerprint != self.fingerprint;
        debug!(change = ?change, changed, "selection change applied");

        self.selection = next;
        self.view = view;
        self.fingerprint = fingerprint;
        Ok(ViewUpdate {
            view: &self.view,
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::{Competitor, CompetitorValues};
    use crate::record::PriceRecord;
    use crate::store::RawRecords;

    fn store() -> RecordStore {
        let raw = RawRecords {
            reference: CompetitorId::new("giocamondo"),
            competitors: vec![
                Competitor::new("giocamondo", "Giocamondo Study", "#009CE0"),
                Competitor::new("ef", "EF Education First", "#EF476F"),
            ],
            prices: vec![PriceRecord {
                destination: "Dublino (IE)".to_string(),
                program: None,
                prices: CompetitorValues::new()
                    .with("giocamondo", 2100.0)
                    .with("ef", 2300.0),
            }],
            ..RawRecords::default()
        };
        RecordStore::load(raw, &EngineConfig::default().facets).unwrap()
    }

    #[test]
    fn new_rejects_unknown_default_competitor() {
        let config = EngineConfig {
            default_competitors: vec![CompetitorId::new("wep")],
            ..EngineConfig::default()
        };
        let err = Engine::new(store(), config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefaults { .. }));
    }

    #[test]
    fn apply_change_routes_every_variant() {
        let engine = Engine::new(store(), EngineConfig::default()).unwrap();
        let sel = engine.initial_selection();
        let sel = engine
            .apply_change(&sel, SelectionChange::SetProgramFilter { value: "study".into() })
            .unwrap();
        assert!(!sel.program().is_all());
        let sel = engine.apply_change(&sel, SelectionChange::Reset).unwrap();
        assert_eq!(sel, engine.initial_selection());
    }

    #[test]
    fn dispatch_reports_unchanged_views() {
        let engine = Engine::new(store(), EngineConfig::default()).unwrap();
        let mut session = Session::new(engine);
        let update = session
            .dispatch(SelectionChange::SetAgeFilter { value: "all".into() })
            .unwrap();
        assert!(!update.changed);

        let update = session
            .dispatch(SelectionChange::ToggleCompetitor { id: "ef".into() })
            .unwrap();
        assert!(update.changed);
    }

    #[test]
    fn rejected_change_keeps_state() {
        let engine = Engine::new(store(), EngineConfig::default()).unwrap();
        let mut session = Session::new(engine);
        let before = session.selection().clone();
        let fingerprint = session.view().fingerprint();
        let err = session
            .dispatch(SelectionChange::SetPriceFilter { value: "cheap".into() })
            .unwrap_err();
        assert!(matches!(err, SelectionError::InvalidFilterValue { facet: "price", .. }));
        assert_eq!(session.selection(), &before);
        assert_eq!(session.view().fingerprint(), fingerprint);
    }

    #[test]
    fn selection_change_parses_from_json() {
        let change: SelectionChange =
            serde_json::from_str(r#"{"type":"toggle_competitor","id":"ef"}"#).unwrap();
        assert_eq!(change, SelectionChange::ToggleCompetitor { id: "ef".into() });
        let change: SelectionChange = serde_json::from_str(r#"{"type":"clear_scenario"}"#).unwrap();
        assert_eq!(change, SelectionChange::ClearScenario);
    }
}
