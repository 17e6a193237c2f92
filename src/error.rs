//! Error types for compintel.
//!
//! All errors are strongly typed using thiserror. Load-time problems surface
//! as [`SchemaError`], rejected selection changes as [`SelectionError`], and
//! metrics that cannot be computed as [`MetricError`]. The view builder never
//! returns a `MetricError`; it turns it into an explicit "not applicable" cell.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of input record, used to point at the offending record in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Competitor,
    Destination,
    Service,
    Price,
    Sentiment,
    Radar,
    Keyword,
    Digital,
    Nps,
    Swot,
    MarketGap,
    AgeSegment,
    JourneyStage,
    JourneyInsight,
    Action,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Competitor => "competitor",
            Self::Destination => "destination",
            Self::Service => "service",
            Self::Price => "price",
            Self::Sentiment => "sentiment",
            Self::Radar => "radar",
            Self::Keyword => "keyword",
            Self::Digital => "digital",
            Self::Nps => "nps",
            Self::Swot => "swot",
            Self::MarketGap => "market_gap",
            Self::AgeSegment => "age_segment",
            Self::JourneyStage => "journey_stage",
            Self::JourneyInsight => "journey_insight",
            Self::Action => "action",
        };
        f.write_str(name)
    }
}

/// Identifies one input record: its kind, position in the input array, and key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    /// Record kind.
    pub kind: RecordKind,
    /// Zero-based index within the input collection.
    pub index: usize,
    /// Human-readable key (name, category, keyword, ...).
    pub key: String,
}

impl RecordRef {
    /// Creates a record reference.
    #[must_use]
    pub fn new(kind: RecordKind, index: usize, key: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            key: key.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} '{}'", self.kind, self.index, self.key)
    }
}

/// Errors raised while loading a record snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{record}: unknown competitor id '{competitor}'")]
    UnknownCompetitor {
        record: RecordRef,
        competitor: String,
    },

    #[error("{record}: field '{field}' value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        record: RecordRef,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{record}: missing entry for reference brand '{reference}'")]
    MissingReferenceEntry {
        record: RecordRef,
        reference: String,
    },

    #[error("{record}: age band '{band}' is not one of the configured bands")]
    UnknownAgeBand {
        record: RecordRef,
        band: String,
    },

    #[error("{record}: journey stage '{stage}' does not exist")]
    UnknownJourneyStage {
        record: RecordRef,
        stage: String,
    },

    #[error("{record}: field '{field}' cannot be empty")]
    EmptyField {
        record: RecordRef,
        field: &'static str,
    },

    #[error("competitor id '{id}' is declared more than once")]
    DuplicateCompetitor {
        id: String,
    },

    #[error("reference brand '{id}' is not a declared competitor")]
    UnknownReferenceBrand {
        id: String,
    },

    #[error("malformed record snapshot: {message}")]
    Malformed {
        message: String,
    },
}

impl SchemaError {
    /// Returns the offending record, when the error is tied to one.
    #[must_use]
    pub const fn record(&self) -> Option<&RecordRef> {
        match self {
            Self::UnknownCompetitor { record, .. }
            | Self::OutOfRange { record, .. }
            | Self::MissingReferenceEntry { record, .. }
            | Self::UnknownAgeBand { record, .. }
            | Self::UnknownJourneyStage { record, .. }
            | Self::EmptyField { record, .. } => Some(record),
            Self::DuplicateCompetitor { .. }
            | Self::UnknownReferenceBrand { .. }
            | Self::Malformed { .. } => None,
        }
    }
}

/// Errors raised by rejected selection changes.
///
/// A rejected change never modifies the selection it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid value '{value}' for {facet} filter")]
    InvalidFilterValue {
        facet: &'static str,
        value: String,
    },

    #[error("unknown competitor: {id}")]
    UnknownCompetitor {
        id: String,
    },

    #[error("invalid scenario: {reason}")]
    InvalidScenario {
        reason: String,
    },
}

/// Errors raised when a derived metric is undefined for the current data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("reference value is absent or zero")]
    UndefinedReference,
}

/// Errors raised by invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid facet configuration: {reason}")]
    InvalidFacets {
        reason: String,
    },

    #[error("invalid gap thresholds: {reason}")]
    InvalidThresholds {
        reason: String,
    },

    #[error("invalid simulation configuration: {reason}")]
    InvalidSimulation {
        reason: String,
    },

    #[error("invalid default selection: {reason}")]
    InvalidDefaults {
        reason: String,
    },

    #[error("failed to parse configuration: {message}")]
    Parse {
        message: String,
    },
}

/// Top-level error type for compintel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntelError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl IntelError {
    /// Returns true if this is a load-time schema error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is a rejected selection change.
    #[must_use]
    pub const fn is_selection(&self) -> bool {
        matches!(self, Self::Selection(_))
    }

    /// Returns true if this is an undefined metric.
    #[must_use]
    pub const fn is_metric(&self) -> bool {
        matches!(self, Self::Metric(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the caller can carry on with its prior state.
    ///
    /// Schema and config errors are fatal to the load or construction that
    /// raised them; selection and metric errors leave prior state usable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Config(_) => false,
            Self::Selection(_) | Self::Metric(_) => true,
        }
    }
}

/// Result type alias for compintel operations.
pub type IntelResult<T> = Result<T, IntelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_record() {
        let err = SchemaError::UnknownCompetitor {
            record: RecordRef::new(RecordKind::Destination, 3, "Londra"),
            competitor: "acme".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("destination #3 'Londra'"));
        assert!(msg.contains("acme"));
        assert_eq!(err.record().map(|r| r.index), Some(3));
    }

    #[test]
    fn test_schema_error_out_of_range() {
        let err = SchemaError::OutOfRange {
            record: RecordRef::new(RecordKind::Sentiment, 0, "Staff"),
            field: "score",
            value: 120.0,
            min: 0.0,
            max: 100.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("120"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_schema_error_without_record() {
        let err = SchemaError::DuplicateCompetitor { id: "ef".to_string() };
        assert!(err.record().is_none());
    }

    #[test]
    fn test_selection_error_message() {
        let err = SelectionError::InvalidFilterValue {
            facet: "age",
            value: "99-100".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("age"));
        assert!(msg.contains("99-100"));
    }

    #[test]
    fn test_intel_error_from_schema() {
        let err: IntelError = SchemaError::Malformed {
            message: "eof".to_string(),
        }
        .into();
        assert!(err.is_schema());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_intel_error_from_selection() {
        let err: IntelError = SelectionError::UnknownCompetitor {
            id: "nope".to_string(),
        }
        .into();
        assert!(err.is_selection());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_intel_error_from_metric_and_config() {
        let metric: IntelError = MetricError::UndefinedReference.into();
        assert!(metric.is_metric());
        assert!(metric.is_recoverable());

        let config: IntelError = ConfigError::InvalidThresholds {
            reason: "low must be >= 1".to_string(),
        }
        .into();
        assert!(config.is_config());
        assert!(!config.is_recoverable());
    }
}
