//! ViewModel: the structured response handed to the renderer.
//!
//! Every surface is a [`Surface`], so an empty filter result is an explicit
//! `Empty` state rather than a missing field. Per-competitor cells only ever
//! list visible competitors, and every derived number is a [`Metric`].

mod builder;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::competitor::{CompetitorId, CompetitorValues};
use crate::facet::{AgeBand, ProgramType};
use crate::metrics::gap::{GapAssessment, Severity};
use crate::metrics::scenario::{ScenarioOutcome, ScenarioParams};
use crate::metrics::{Metric, SentimentSummary};
use crate::record::{Capability, GeoPoint, Horizon, InsightKind, Quadrant};

pub use builder::{build, build_with};

/// State of one view surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Surface<T> {
    /// Surface has data.
    Ready(T),
    /// Surface was requested but nothing survived the filters.
    Empty,
    /// Surface was left out of the [`ViewRequest`].
    NotRequested,
}

impl<T> Surface<T> {
    /// The data, if ready.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Empty | Self::NotRequested => None,
        }
    }

    /// Returns true if the surface has data.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns true if the surface was requested but has no data.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Identifies one surface of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Destination map, grouped by region.
    Destinations,
    /// Brand comparison radar.
    Radar,
    /// Service comparison matrix.
    Services,
    /// SWOT quadrants.
    Swot,
    /// Review sentiment and NPS.
    Sentiment,
    /// Market gaps and age segments.
    Market,
    /// SEO keyword positions.
    Keywords,
    /// Digital presence metrics.
    Digital,
    /// Per-destination pricing table.
    Pricing,
    /// Price comparison matrix.
    PriceMatrix,
    /// Pricing simulator.
    Scenario,
    /// Customer journey.
    Journey,
    /// Action plan.
    Actions,
}

impl SurfaceKind {
    /// Every surface, in dashboard order.
    pub const ALL: [Self; 13] = [
        Self::Destinations,
        Self::Radar,
        Self::Services,
        Self::Swot,
        Self::Sentiment,
        Self::Market,
        Self::Keywords,
        Self::Digital,
        Self::Pricing,
        Self::PriceMatrix,
        Self::Scenario,
        Self::Journey,
        Self::Actions,
    ];
}

/// Which surfaces to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    surfaces: BTreeSet<SurfaceKind>,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self::all()
    }
}

impl ViewRequest {
    /// Requests every surface.
    #[must_use]
    pub fn all() -> Self {
        Self {
            surfaces: SurfaceKind::ALL.into_iter().collect(),
        }
    }

    /// Requests only the given surfaces.
    #[must_use]
    pub fn only(surfaces: impl IntoIterator<Item = SurfaceKind>) -> Self {
        Self {
            surfaces: surfaces.into_iter().collect(),
        }
    }

    /// Returns true if `kind` is requested.
    #[must_use]
    pub fn contains(&self, kind: SurfaceKind) -> bool {
        self.surfaces.contains(&kind)
    }
}

/// A visible competitor column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorColumn {
    /// Competitor id.
    pub id: CompetitorId,
    /// Display name.
    pub name: String,
    /// Chart color.
    pub color: String,
    /// True for the reference brand's column.
    pub is_reference: bool,
}

/// A destination marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationPin {
    /// Destination name.
    pub name: String,
    /// Map position.
    pub location: GeoPoint,
    /// Competitor offering it.
    pub competitor: CompetitorId,
    /// Program type.
    pub program: ProgramType,
    /// Target age band.
    pub age_band: AgeBand,
    /// Listed price.
    pub price: f64,
}

/// Destinations of one region, in store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGroup {
    /// Region label.
    pub region: String,
    /// Pins of the region.
    pub destinations: Vec<DestinationPin>,
}

/// One radar axis with the reference brand's rank on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarRow {
    /// Axis label.
    pub subject: String,
    /// Visible competitors' scores.
    pub scores: CompetitorValues<f64>,
    /// Reference brand's rank and severity.
    pub gap: Metric<GapAssessment>,
}

/// One service of the comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRow {
    /// Service line.
    pub name: String,
    /// Visible competitors' offers.
    pub cells: CompetitorValues<Capability>,
}

/// Services grouped by category, categories in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    /// Category name.
    pub category: String,
    /// Services in store order.
    pub rows: Vec<ServiceRow>,
}

/// A SWOT bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotEntry {
    /// Headline.
    pub title: String,
    /// Detail text.
    pub description: String,
    /// Competitor it is framed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor: Option<CompetitorId>,
}

/// SWOT items bucketed by quadrant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwotBuckets {
    /// Strengths.
    pub strengths: Vec<SwotEntry>,
    /// Weaknesses.
    pub weaknesses: Vec<SwotEntry>,
    /// Opportunities.
    pub opportunities: Vec<SwotEntry>,
    /// Threats.
    pub threats: Vec<SwotEntry>,
}

impl SwotBuckets {
    pub(crate) fn bucket_mut(&mut self, quadrant: Quadrant) -> &mut Vec<SwotEntry> {
        match quadrant {
            Quadrant::Strength => &mut self.strengths,
            Quadrant::Weakness => &mut self.weaknesses,
            Quadrant::Opportunity => &mut self.opportunities,
            Quadrant::Threat => &mut self.threats,
        }
    }
}

/// One sentiment category with the reference brand's rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    /// Review category.
    pub category: String,
    /// Visible competitors' positive share.
    pub scores: CompetitorValues<f64>,
    /// Reference brand's rank and severity.
    pub gap: Metric<GapAssessment>,
}

/// Sentiment chart series plus the NPS summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPanel {
    /// Chart series, one row per category.
    pub series: Vec<SentimentRow>,
    /// NPS of the visible competitors.
    pub nps: CompetitorValues<f64>,
    /// Reference brand summary.
    pub summary: SentimentSummary,
}

/// Unserved segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketGapRow {
    /// Segment name.
    pub segment: String,
    /// Detail text.
    pub description: String,
    /// Size of the opportunity.
    pub potential: Severity,
    /// Competitor already serving it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor: Option<CompetitorId>,
}

/// Age band share with its growth headroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeSegmentRow {
    /// Age band.
    pub band: AgeBand,
    /// Share held today.
    pub current_share: f64,
    /// Share judged reachable.
    pub potential_share: f64,
    /// `potential - current`, in percentage points.
    pub headroom: f64,
}

/// Market gaps and age segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPanel {
    /// Highest potential first; ties keep store order.
    pub gaps: Vec<MarketGapRow>,
    /// Age segments in store order.
    pub age_segments: Vec<AgeSegmentRow>,
}

/// SEO keyword positions with the reference brand's rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRow {
    /// Search query.
    pub keyword: String,
    /// Monthly searches.
    pub monthly_volume: u64,
    /// Visible competitors' positions.
    pub positions: CompetitorValues<u32>,
    /// Reference brand's rank and severity.
    pub gap: Metric<GapAssessment>,
}

/// One digital presence metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalRow {
    /// Channel.
    pub channel: String,
    /// What is measured.
    pub metric: String,
    /// Visible competitors' values.
    pub values: CompetitorValues<f64>,
    /// Each rival against the reference brand, in percent.
    pub diffs: CompetitorValues<Metric>,
}

/// One filtered destination in the pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    /// Destination name.
    pub destination: String,
    /// Competitor offering it.
    pub competitor: CompetitorId,
    /// Program type.
    pub program: ProgramType,
    /// Target age band.
    pub age_band: AgeBand,
    /// Listed price.
    pub price: f64,
    /// Price against the reference brand's price for the same destination.
    pub diff_pct: Metric,
}

/// One destination of the price matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMatrixRow {
    /// Destination key.
    pub destination: String,
    /// Program type, if specific to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramType>,
    /// Visible competitors' prices.
    pub prices: CompetitorValues<f64>,
    /// Each visible rival against the reference price, in percent.
    pub diffs: CompetitorValues<Metric>,
    /// Mean visible rival price against the reference price.
    pub mean_diff: Metric,
    /// Reference brand's price rank, cheapest first.
    pub gap: Metric<GapAssessment>,
}

/// Pricing simulator inputs and result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPanel {
    /// Inputs as selected.
    pub params: ScenarioParams,
    /// Result, not applicable without a baseline price.
    pub outcome: Metric<ScenarioOutcome>,
}

/// A friction or advantage at a journey stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyNote {
    /// Friction or advantage.
    pub kind: InsightKind,
    /// Headline.
    pub title: String,
    /// Detail text.
    pub description: String,
    /// Impact on conversion.
    pub impact: Severity,
    /// Suggested response.
    pub action: String,
    /// Competitor it refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor: Option<CompetitorId>,
}

/// A customer journey stage with its insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStageView {
    /// Stage name.
    pub name: String,
    /// Detail text.
    pub description: String,
    /// Channels used at this stage.
    pub touchpoints: Vec<String>,
    /// Frictions in store order.
    pub frictions: Vec<JourneyNote>,
    /// Advantages in store order.
    pub advantages: Vec<JourneyNote>,
}

/// Action items bucketed by horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// 1-3 months.
    pub short: Vec<String>,
    /// 3-6 months.
    pub medium: Vec<String>,
    /// 6-12 months.
    pub long: Vec<String>,
}

impl ActionPlan {
    pub(crate) fn bucket_mut(&mut self, horizon: Horizon) -> &mut Vec<String> {
        match horizon {
            Horizon::Short => &mut self.short,
            Horizon::Medium => &mut self.medium,
            Horizon::Long => &mut self.long,
        }
    }
}

/// The complete comparative view for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    /// Layout version of this struct.
    pub version: u32,
    /// Snapshot date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    /// Reference brand id.
    pub reference: CompetitorId,
    /// Visible competitors: reference first, then selected in table order.
    pub competitors: Vec<CompetitorColumn>,
    /// Destination map.
    pub destinations: Surface<Vec<RegionGroup>>,
    /// Brand radar.
    pub radar: Surface<Vec<RadarRow>>,
    /// Service matrix.
    pub services: Surface<Vec<ServiceCategory>>,
    /// SWOT quadrants.
    pub swot: Surface<SwotBuckets>,
    /// Sentiment and NPS.
    pub sentiment: Surface<SentimentPanel>,
    /// Market gaps and age segments.
    pub market: Surface<MarketPanel>,
    /// SEO keyword table.
    pub keywords: Surface<Vec<KeywordRow>>,
    /// Digital presence.
    pub digital: Surface<Vec<DigitalRow>>,
    /// Pricing table, one row per filtered destination.
    pub pricing: Surface<Vec<PricingRow>>,
    /// Price matrix.
    pub price_matrix: Surface<Vec<PriceMatrixRow>>,
    /// Pricing simulator.
    pub scenario: Surface<ScenarioPanel>,
    /// Customer journey.
    pub journey: Surface<Vec<JourneyStageView>>,
    /// Action plan.
    pub actions: Surface<ActionPlan>,
}

impl ViewModel {
    /// Current layout version.
    pub const VERSION: u32 = 1;

    /// blake3 hash of the JSON encoding, for change detection.
    ///
    /// Two views with equal content always share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        // Serializing plain data structs into a Vec cannot fail.
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        *hasher.finalize().as_bytes()
    }

    /// Returns the visible column for `id`.
    #[must_use]
    pub fn column(&self, id: &CompetitorId) -> Option<&CompetitorColumn> {
        self.competitors.iter().find(|c| &c.id == id)
    }
}
