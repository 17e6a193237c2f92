//! Competitor identity and the per-competitor value map.
//!
//! Every record kind is joined to the others through a [`CompetitorId`]. The
//! set of ids is closed: it is fixed by the [`CompetitorTable`] loaded with the
//! snapshot, and per-competitor maps that mention any other id are rejected at
//! load time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable string key of a competitor (e.g. `"ef"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(String);

impl CompetitorId {
    /// Creates an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompetitorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CompetitorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A competitor (or the reference brand itself).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    /// Unique key.
    pub id: CompetitorId,
    /// Display name.
    pub name: String,
    /// Display color, passed through untouched to the renderer.
    #[serde(default)]
    pub color: String,
}

impl Competitor {
    /// Creates a competitor.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: CompetitorId::new(id),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The closed lookup table of competitors, in declaration order.
///
/// Exactly one entry is the reference brand. Built by the record store after
/// validation, so lookups never need to handle an inconsistent table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompetitorTable {
    entries: Vec<Competitor>,
    reference: CompetitorId,
}

impl CompetitorTable {
    /// Creates a table. Callers are expected to have checked that ids are
    /// unique and that `reference` is one of them.
    pub(crate) fn new(entries: Vec<Competitor>, reference: CompetitorId) -> Self {
        Self { entries, reference }
    }

    /// The reference brand id.
    #[must_use]
    pub const fn reference(&self) -> &CompetitorId {
        &self.reference
    }

    /// Returns true if `id` is the reference brand.
    #[must_use]
    pub fn is_reference(&self, id: &CompetitorId) -> bool {
        &self.reference == id
    }

    /// Looks up a competitor by id.
    #[must_use]
    pub fn get(&self, id: &CompetitorId) -> Option<&Competitor> {
        self.entries.iter().find(|c| &c.id == id)
    }

    /// Looks up a competitor by raw string id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Competitor> {
        self.entries.iter().find(|c| c.id.as_str() == id)
    }

    /// Returns true if `id` is a known competitor.
    #[must_use]
    pub fn contains(&self, id: &CompetitorId) -> bool {
        self.get(id).is_some()
    }

    /// All competitors, reference included, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.entries.iter()
    }

    /// Competitors other than the reference, in declaration order.
    pub fn rivals(&self) -> impl Iterator<Item = &Competitor> {
        self.entries.iter().filter(move |c| c.id != self.reference)
    }

    /// Number of competitors, reference included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-competitor values for one record (prices, scores, capabilities, ...).
///
/// Absence of a key means "no value for this competitor"; it is never treated
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorValues<T>(BTreeMap<CompetitorId, T>);

impl<T> Default for CompetitorValues<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> CompetitorValues<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, id: impl Into<CompetitorId>, value: T) -> Self {
        self.0.insert(id.into(), value);
        self
    }

    /// Inserts a value.
    pub fn insert(&mut self, id: CompetitorId, value: T) {
        self.0.insert(id, value);
    }

    /// Value for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &CompetitorId) -> Option<&T> {
        self.0.get(id)
    }

    /// Returns true if a value is present for `id`.
    #[must_use]
    pub fn contains(&self, id: &CompetitorId) -> bool {
        self.0.contains_key(id)
    }

    /// Present entries, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&CompetitorId, &T)> {
        self.0.iter()
    }

    /// Ids with a present value.
    pub fn keys(&self) -> impl Iterator<Item = &CompetitorId> {
        self.0.keys()
    }

    /// Number of present entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no entry is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Clone> CompetitorValues<T> {
    /// Copy of this map restricted to `visible` ids.
    #[must_use]
    pub fn project(&self, visible: &BTreeSet<CompetitorId>) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(id, _)| visible.contains(*id))
                .map(|(id, v)| (id.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<T> FromIterator<(CompetitorId, T)> for CompetitorValues<T> {
    fn from_iter<I: IntoIterator<Item = (CompetitorId, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CompetitorTable {
        CompetitorTable::new(
            vec![
                Competitor::new("ref", "Reference", "#009CE0"),
                Competitor::new("ef", "EF Education First", "#EF476F"),
                Competitor::new("iter", "ITER", "#06D6A0"),
            ],
            CompetitorId::new("ref"),
        )
    }

    #[test]
    fn table_lookup_and_reference() {
        let t = table();
        assert!(t.is_reference(&CompetitorId::new("ref")));
        assert!(!t.is_reference(&CompetitorId::new("ef")));
        assert_eq!(t.find("iter").map(|c| c.name.as_str()), Some("ITER"));
        assert!(t.find("inter").is_none());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn rivals_skip_reference_and_keep_order() {
        let t = table();
        let ids: Vec<&str> = t.rivals().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ef", "iter"]);
    }

    #[test]
    fn project_keeps_only_visible() {
        let values = CompetitorValues::new()
            .with("ref", 2290.0)
            .with("ef", 2450.0)
            .with("iter", 2150.0);
        let visible: BTreeSet<CompetitorId> =
            [CompetitorId::new("ref"), CompetitorId::new("ef")].into_iter().collect();
        let projected = values.project(&visible);
        assert_eq!(projected.len(), 2);
        assert!(projected.contains(&CompetitorId::new("ef")));
        assert!(!projected.contains(&CompetitorId::new("iter")));
    }

    #[test]
    fn values_deserialize_from_json_object() {
        let values: CompetitorValues<f64> =
            serde_json::from_str(r#"{"ref": 88.0, "ef": 82.0}"#).unwrap();
        assert_eq!(values.get(&CompetitorId::new("ef")), Some(&82.0));
        assert!(values.get(&CompetitorId::new("iter")).is_none());
    }
}
