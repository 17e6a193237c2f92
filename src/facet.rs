//! Filter facets: program types, age bands, price bands.
//!
//! Program types are a closed enum. Age bands and price bands are fixed per
//! engine instance but come from configuration, so they are validated against
//! [`FacetConfig`](crate::config::FacetConfig) rather than encoded as enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wildcard accepted by every facet.
pub const ALL: &str = "all";

/// Kind of program a destination belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    /// Summer camps.
    Summer,
    /// Study-abroad trips.
    Study,
    /// High-school year/semester abroad.
    #[serde(rename = "highschool")]
    HighSchool,
    /// School tourism (class trips).
    #[serde(rename = "school")]
    SchoolTourism,
}

impl ProgramType {
    /// All program types, in menu order.
    pub const ALL: [Self; 4] = [Self::Summer, Self::Study, Self::HighSchool, Self::SchoolTourism];

    /// Wire name of this program type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Study => "study",
            Self::HighSchool => "highschool",
            Self::SchoolTourism => "school",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

/// Age band label (e.g. `"11-14"`), one of the configured bands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeBand(String);

impl AgeBand {
    /// Creates a band label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The band label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgeBand {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

/// Half-open price interval `[min, max)`; `max = None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    /// Menu label (e.g. `"1000-2000"`).
    pub label: String,
    /// Inclusive lower bound.
    pub min: f64,
    /// Exclusive upper bound.
    #[serde(default)]
    pub max: Option<f64>,
}

impl PriceBand {
    /// Creates a bounded band.
    #[must_use]
    pub fn bounded(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max: Some(max),
        }
    }

    /// Creates a band with no upper bound.
    #[must_use]
    pub fn open(label: impl Into<String>, min: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max: None,
        }
    }

    /// Returns true if `price` falls in `[min, max)`.
    ///
    /// A price exactly on a boundary belongs to the band that starts there.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price < max)
    }
}

/// A facet value: either the wildcard or one concrete member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum Facet<T> {
    /// No restriction.
    All,
    /// Restrict to this member.
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Facet<T> {
    /// Returns true if this facet is the wildcard.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The concrete member, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(v) => Some(v),
        }
    }

    /// Evaluates the facet predicate: the wildcard accepts everything,
    /// otherwise `test` decides.
    pub fn accepts(&self, test: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Self::All => true,
            Self::Only(v) => test(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_type_round_trips_through_wire_name() {
        for p in ProgramType::ALL {
            assert_eq!(p.as_str().parse::<ProgramType>(), Ok(p));
        }
        assert!("camp".parse::<ProgramType>().is_err());
        let json = serde_json::to_string(&ProgramType::HighSchool).unwrap();
        assert_eq!(json, "\"highschool\"");
    }

    #[test]
    fn price_band_boundary_belongs_to_higher_band() {
        let low = PriceBand::bounded("0-1000", 0.0, 1000.0);
        let mid = PriceBand::bounded("1000-2000", 1000.0, 2000.0);
        assert!(!low.contains(1000.0));
        assert!(mid.contains(1000.0));
        assert!(low.contains(999.99));
        assert!(!mid.contains(2000.0));
    }

    #[test]
    fn open_band_has_no_ceiling() {
        let top = PriceBand::open("3000+", 3000.0);
        assert!(top.contains(3000.0));
        assert!(top.contains(1.0e9));
        assert!(!top.contains(2999.0));
    }

    #[test]
    fn facet_all_accepts_everything() {
        let all: Facet<ProgramType> = Facet::All;
        assert!(all.accepts(|p| *p == ProgramType::Study));
        let only = Facet::Only(ProgramType::Summer);
        assert!(!only.accepts(|p| *p == ProgramType::Study));
        assert!(only.accepts(|p| *p == ProgramType::Summer));
    }
}
