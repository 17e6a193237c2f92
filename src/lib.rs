//! # compintel - competitive intelligence filter and aggregation engine
//!
//! compintel turns a static snapshot of competitor records (destinations,
//! prices, services, sentiment, search rankings, strategic notes) into a
//! comparative view of one reference brand against a user-chosen set of
//! competitors, narrowed by age, program and price facets.
//!
//! ## Core Concepts
//!
//! - **RecordStore**: An immutable, validated snapshot of every record kind
//! - **Selection**: The user's facets, selected competitors and pricing scenario
//! - **FilteredSubsets**: Records surviving a selection, projected onto visible competitors
//! - **Metrics**: Percentage differences, gap severities and scenario outcomes
//! - **ViewModel**: The structured response the renderer consumes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use compintel::{Engine, EngineConfig, SelectionChange, Session};
//!
//! let engine = Engine::from_json(&records_json, EngineConfig::default())?;
//! let mut session = Session::new(engine);
//!
//! let update = session.dispatch(SelectionChange::SetAgeFilter { value: "11-14".into() })?;
//! if update.changed {
//!     render(update.view);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Snapshot and identity
pub mod competitor;
pub mod error;
pub mod facet;
pub mod record;
pub mod store;

// Query pipeline
pub mod config;
pub mod engine;
pub mod filter;
pub mod metrics;
pub mod selection;
pub mod view;

// Re-export primary types at crate root for convenience
pub use competitor::{Competitor, CompetitorId, CompetitorTable, CompetitorValues};
pub use config::{EngineConfig, FacetConfig};
pub use engine::{Engine, SelectionChange, Session, ViewUpdate};
pub use error::{
    ConfigError, IntelError, IntelResult, MetricError, RecordKind, RecordRef, SchemaError,
    SelectionError,
};
pub use facet::{AgeBand, Facet, PriceBand, ProgramType};
pub use filter::FilteredSubsets;
pub use metrics::gap::{GapAssessment, GapConfig, GapThresholds, MetricKind, RankDirection, Severity};
pub use metrics::scenario::{AddOn, Elasticities, ScenarioOutcome, ScenarioParams, SimulationConfig};
pub use metrics::{diff_pct, Metric, Metrics, MetricsCalculator};
pub use record::{
    ActionItem, AgeSegmentShare, Capability, Destination, DigitalMetric, GeoPoint, Horizon,
    InsightKind, JourneyInsight, JourneyStage, KeywordRanking, MarketGap, NpsScore, PriceRecord,
    Quadrant, RadarAxis, SentimentScore, ServiceOffering, SwotItem,
};
pub use selection::Selection;
pub use store::{RawRecords, RecordStore};
pub use view::{Surface, SurfaceKind, ViewModel, ViewRequest};
