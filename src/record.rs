//! Record types held by the [`RecordStore`](crate::store::RecordStore).
//!
//! Records are plain data. They are validated once by the store at load time
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::competitor::{CompetitorId, CompetitorValues};
use crate::facet::{AgeBand, ProgramType};
use crate::metrics::gap::Severity;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, [-90, 90].
    pub lat: f64,
    /// Longitude, [-180, 180].
    pub lon: f64,
}

/// One destination offered by one competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Destination name, the key shared across competitors (e.g. `"Londra (UK)"`).
    pub name: String,
    /// Grouping label for the map surface (e.g. `"Europa"`).
    #[serde(default)]
    pub region: String,
    /// Map position.
    pub location: GeoPoint,
    /// Competitor offering it.
    pub competitor: CompetitorId,
    /// Program type.
    pub program: ProgramType,
    /// Target age band.
    pub age_band: AgeBand,
    /// Price in the snapshot's single currency unit.
    pub price: f64,
}

/// What one competitor offers for a service line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capability {
    /// Free-form description, e.g. `"12 programmi"`.
    Text(String),
    /// Structured has/count fact.
    Fact {
        /// Whether the service is offered.
        available: bool,
        /// Number of programs, installments, ...
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        /// Short qualifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl Capability {
    /// Returns false only for an explicit "not available" fact.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Fact { available, .. } => *available,
        }
    }
}

/// A row of the service matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Matrix section (e.g. `"Programmi"`).
    pub category: String,
    /// Service line.
    pub name: String,
    /// What each competitor offers.
    pub capabilities: CompetitorValues<Capability>,
}

/// Per-competitor prices for one destination key.
///
/// A missing competitor entry means that competitor does not serve the
/// destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Destination key.
    pub destination: String,
    /// Program type, if the record is specific to one.
    #[serde(default)]
    pub program: Option<ProgramType>,
    /// Price per competitor.
    pub prices: CompetitorValues<f64>,
}

/// Review sentiment per competitor for one category, as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Review category (e.g. `"Staff"`).
    pub category: String,
    /// Positive share per competitor, [0, 100].
    pub scores: CompetitorValues<f64>,
}

/// One axis of the brand comparison radar, scores on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxis {
    /// Axis label.
    pub subject: String,
    /// Score per competitor, [0, 10].
    pub scores: CompetitorValues<f64>,
}

/// Search ranking positions for one keyword (1 = top result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRanking {
    /// Search query.
    pub keyword: String,
    /// Monthly searches.
    pub monthly_volume: u64,
    /// Ranking position per competitor.
    pub positions: CompetitorValues<u32>,
}

/// A digital presence measurement (followers, load time, conversion, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalMetric {
    /// Channel (e.g. `"instagram"`).
    pub channel: String,
    /// What is measured on the channel.
    pub metric: String,
    /// Measured value per competitor.
    pub values: CompetitorValues<f64>,
}

/// Net promoter score of one competitor, [-100, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpsScore {
    /// Competitor scored.
    pub competitor: CompetitorId,
    /// Score.
    pub score: f64,
}

/// SWOT quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Internal, positive.
    Strength,
    /// Internal, negative.
    Weakness,
    /// External, positive.
    Opportunity,
    /// External, negative.
    Threat,
}

/// A SWOT entry, optionally framed against one competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwotItem {
    /// Quadrant.
    pub quadrant: Quadrant,
    /// Headline.
    pub title: String,
    /// Detail text.
    #[serde(default)]
    pub description: String,
    /// Competitor the entry is framed against; hidden with it.
    #[serde(default)]
    pub competitor: Option<CompetitorId>,
}

/// An identified market gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketGap {
    /// Market segment (e.g. `"Gap year"`).
    pub segment: String,
    /// Detail text.
    #[serde(default)]
    pub description: String,
    /// Size of the opportunity.
    pub potential: Severity,
    /// Competitor already serving the segment.
    #[serde(default)]
    pub competitor: Option<CompetitorId>,
}

/// Current vs potential market share of an age segment, as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeSegmentShare {
    /// Age band.
    pub band: AgeBand,
    /// Share held today.
    pub current_share: f64,
    /// Share judged reachable.
    pub potential_share: f64,
}

/// A customer journey stage with its touchpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStage {
    /// Stage name, referenced by insights.
    pub name: String,
    /// Detail text.
    #[serde(default)]
    pub description: String,
    /// Channels used at this stage.
    #[serde(default)]
    pub touchpoints: Vec<String>,
}

/// Whether a journey insight hurts or helps the reference brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Hurts the reference brand.
    Friction,
    /// Helps the reference brand.
    Advantage,
}

/// A friction point or competitive advantage at one journey stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyInsight {
    /// Journey stage name.
    pub stage: String,
    /// Friction or advantage.
    pub kind: InsightKind,
    /// Headline.
    pub title: String,
    /// Detail text.
    #[serde(default)]
    pub description: String,
    /// Impact on conversion.
    pub impact: Severity,
    /// Suggested response.
    #[serde(default)]
    pub action: String,
    /// Competitor the insight refers to; hidden with it.
    #[serde(default)]
    pub competitor: Option<CompetitorId>,
}

/// Planning horizon of an action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// 1-3 months.
    Short,
    /// 3-6 months.
    Medium,
    /// 6-12 months.
    Long,
}

impl Horizon {
    /// Horizons in display order.
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];
}

/// A planned action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// When it is planned.
    pub horizon: Horizon,
    /// What to do.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_accepts_text_or_fact() {
        let text: Capability = serde_json::from_str(r#""15+ programmi""#).unwrap();
        assert_eq!(text, Capability::Text("15+ programmi".to_string()));
        assert!(text.is_available());

        let fact: Capability =
            serde_json::from_str(r#"{"available": false}"#).unwrap();
        assert!(!fact.is_available());

        let counted: Capability =
            serde_json::from_str(r#"{"available": true, "count": 12}"#).unwrap();
        assert_eq!(
            counted,
            Capability::Fact {
                available: true,
                count: Some(12),
                note: None
            }
        );
    }

    #[test]
    fn destination_deserializes_program_wire_names() {
        let json = r#"{
            "name": "Toronto",
            "region": "America del Nord",
            "location": {"lat": 43.6532, "lon": -79.3832},
            "competitor": "ref",
            "program": "highschool",
            "age_band": "15-18",
            "price": 4150
        }"#;
        let d: Destination = serde_json::from_str(json).unwrap();
        assert_eq!(d.program, ProgramType::HighSchool);
        assert_eq!(d.age_band.as_str(), "15-18");
        assert!((d.price - 4150.0).abs() < f64::EPSILON);
    }
}
