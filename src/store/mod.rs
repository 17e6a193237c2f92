//! Record store.
//!
//! A [`RecordStore`] is an immutable, validated snapshot of every record
//! kind. It is built once from [`RawRecords`] (usually parsed from JSON by an
//! external loader) and only exposes read accessors afterwards.

mod validation;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::competitor::{Competitor, CompetitorId, CompetitorTable};
use crate::config::FacetConfig;
use crate::error::SchemaError;
use crate::record::{
    ActionItem, AgeSegmentShare, Destination, DigitalMetric, JourneyInsight, JourneyStage,
    KeywordRanking, MarketGap, NpsScore, PriceRecord, RadarAxis, SentimentScore, ServiceOffering,
    SwotItem,
};

/// Unvalidated input snapshot, matching the external record schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecords {
    /// Id of the reference brand; must be one of `competitors`.
    pub reference: CompetitorId,
    /// Competitor lookup table, reference included.
    pub competitors: Vec<Competitor>,
    /// Destinations.
    pub destinations: Vec<Destination>,
    /// Service matrix rows.
    pub services: Vec<ServiceOffering>,
    /// Price comparison records.
    pub prices: Vec<PriceRecord>,
    /// Review sentiment categories.
    pub sentiment: Vec<SentimentScore>,
    /// Radar axes.
    pub radar: Vec<RadarAxis>,
    /// SEO keywords.
    pub keywords: Vec<KeywordRanking>,
    /// Digital presence metrics.
    pub digital: Vec<DigitalMetric>,
    /// NPS per competitor.
    pub nps: Vec<NpsScore>,
    /// SWOT items.
    pub swot: Vec<SwotItem>,
    /// Market gaps.
    pub market_gaps: Vec<MarketGap>,
    /// Age segment shares.
    pub age_segments: Vec<AgeSegmentShare>,
    /// Journey stages, in order.
    pub journey_stages: Vec<JourneyStage>,
    /// Journey frictions and advantages.
    pub journey_insights: Vec<JourneyInsight>,
    /// Action plan items.
    pub actions: Vec<ActionItem>,
    /// Date the snapshot was last refreshed.
    pub as_of: Option<NaiveDate>,
}

/// Immutable, validated record snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    competitors: CompetitorTable,
    destinations: Vec<Destination>,
    services: Vec<ServiceOffering>,
    prices: Vec<PriceRecord>,
    sentiment: Vec<SentimentScore>,
    radar: Vec<RadarAxis>,
    keywords: Vec<KeywordRanking>,
    digital: Vec<DigitalMetric>,
    nps: Vec<NpsScore>,
    swot: Vec<SwotItem>,
    market_gaps: Vec<MarketGap>,
    age_segments: Vec<AgeSegmentShare>,
    journey_stages: Vec<JourneyStage>,
    journey_insights: Vec<JourneyInsight>,
    actions: Vec<ActionItem>,
    as_of: Option<NaiveDate>,
}

impl RecordStore {
    /// Validates `raw` and builds a store from it.
    ///
    /// Fails on the first record that references an unknown competitor,
    /// carries an out-of-range number, or breaks a per-kind invariant. The
    /// error names the offending record.
    pub fn load(raw: RawRecords, facets: &FacetConfig) -> Result<Self, SchemaError> {
        let competitors = validation::competitor_table(raw.competitors, raw.reference)?;
        let ctx = validation::Context {
            competitors: &competitors,
            facets,
        };

        ctx.destinations(&raw.destinations)?;
        ctx.services(&raw.services)?;
        ctx.prices(&raw.prices)?;
        ctx.sentiment(&raw.sentiment)?;
        ctx.radar(&raw.radar)?;
        ctx.keywords(&raw.keywords)?;
        ctx.digital(&raw.digital)?;
        ctx.nps(&raw.nps)?;
        ctx.swot(&raw.swot)?;
        ctx.market_gaps(&raw.market_gaps)?;
        ctx.age_segments(&raw.age_segments)?;
        ctx.journey(&raw.journey_stages, &raw.journey_insights)?;
        ctx.actions(&raw.actions)?;

        info!(
            reference = %competitors.reference(),
            competitors = competitors.len(),
            destinations = raw.destinations.len(),
            services = raw.services.len(),
            prices = raw.prices.len(),
            sentiment = raw.sentiment.len(),
            keywords = raw.keywords.len(),
            "record snapshot loaded"
        );

        Ok(Self {
            competitors,
            destinations: raw.destinations,
            services: raw.services,
            prices: raw.prices,
            sentiment: raw.sentiment,
            radar: raw.radar,
            keywords: raw.keywords,
            digital: raw.digital,
            nps: raw.nps,
            swot: raw.swot,
            market_gaps: raw.market_gaps,
            age_segments: raw.age_segments,
            journey_stages: raw.journey_stages,
            journey_insights: raw.journey_insights,
            actions: raw.actions,
            as_of: raw.as_of,
        })
    }

    /// Parses a JSON snapshot and loads it.
    pub fn from_json(json: &str, facets: &FacetConfig) -> Result<Self, SchemaError> {
        let raw: RawRecords = serde_json::from_str(json).map_err(|e| SchemaError::Malformed {
            message: e.to_string(),
        })?;
        Self::load(raw, facets)
    }

    /// The competitor lookup table.
    #[must_use]
    pub const fn competitors(&self) -> &CompetitorTable {
        &self.competitors
    }

    /// The reference brand id.
    #[must_use]
    pub const fn reference(&self) -> &CompetitorId {
        self.competitors.reference()
    }

    /// Destinations, in input order.
    #[must_use]
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Service matrix rows, in input order.
    #[must_use]
    pub fn services(&self) -> &[ServiceOffering] {
        &self.services
    }

    /// Price comparison records, in input order.
    #[must_use]
    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }

    /// Sentiment categories, in input order.
    #[must_use]
    pub fn sentiment(&self) -> &[SentimentScore] {
        &self.sentiment
    }

    /// Radar axes, in input order.
    #[must_use]
    pub fn radar(&self) -> &[RadarAxis] {
        &self.radar
    }

    /// SEO keywords, in input order.
    #[must_use]
    pub fn keywords(&self) -> &[KeywordRanking] {
        &self.keywords
    }

    /// Digital presence metrics, in input order.
    #[must_use]
    pub fn digital(&self) -> &[DigitalMetric] {
        &self.digital
    }

    /// NPS per competitor, in input order.
    #[must_use]
    pub fn nps(&self) -> &[NpsScore] {
        &self.nps
    }

    /// SWOT items, in input order.
    #[must_use]
    pub fn swot(&self) -> &[SwotItem] {
        &self.swot
    }

    /// Market gaps, in input order.
    #[must_use]
    pub fn market_gaps(&self) -> &[MarketGap] {
        &self.market_gaps
    }

    /// Age segment shares, in input order.
    #[must_use]
    pub fn age_segments(&self) -> &[AgeSegmentShare] {
        &self.age_segments
    }

    /// Journey stages, in input order.
    #[must_use]
    pub fn journey_stages(&self) -> &[JourneyStage] {
        &self.journey_stages
    }

    /// Journey insights, in input order.
    #[must_use]
    pub fn journey_insights(&self) -> &[JourneyInsight] {
        &self.journey_insights
    }

    /// Action items, in input order.
    #[must_use]
    pub fn actions(&self) -> &[ActionItem] {
        &self.actions
    }

    /// Date the snapshot was last refreshed, if known.
    #[must_use]
    pub const fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}
