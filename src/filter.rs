//! Filter engine.
//!
//! Applies a [`Selection`] to a [`RecordStore`]. Filtering is total and never
//! fails: every record kind is either kept, dropped, or has its
//! per-competitor map projected onto the visible competitors. Relative order
//! of kept records always matches store order.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::competitor::CompetitorId;
use crate::facet::ProgramType;
use crate::metrics::scenario::ScenarioParams;
use crate::record::{
    ActionItem, AgeSegmentShare, Destination, DigitalMetric, JourneyInsight, JourneyStage,
    KeywordRanking, MarketGap, NpsScore, PriceRecord, RadarAxis, SentimentScore, ServiceOffering,
    SwotItem,
};
use crate::selection::Selection;
use crate::store::RecordStore;

/// Records that survive a selection, with per-competitor maps projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSubsets {
    /// The reference brand id.
    pub reference: CompetitorId,
    /// Reference first, then selected competitors in table order.
    pub visible: Vec<CompetitorId>,
    /// Destinations passing age, program and price band.
    pub destinations: Vec<Destination>,
    /// Services, projected.
    pub services: Vec<ServiceOffering>,
    /// Price records passing program and reference price band, projected.
    pub prices: Vec<PriceRecord>,
    /// Sentiment categories, projected.
    pub sentiment: Vec<SentimentScore>,
    /// Radar axes, projected.
    pub radar: Vec<RadarAxis>,
    /// Keywords, projected.
    pub keywords: Vec<KeywordRanking>,
    /// Digital metrics, projected.
    pub digital: Vec<DigitalMetric>,
    /// NPS of visible competitors.
    pub nps: Vec<NpsScore>,
    /// SWOT items not tied to a hidden competitor.
    pub swot: Vec<SwotItem>,
    /// Market gaps not tied to a hidden competitor.
    pub market_gaps: Vec<MarketGap>,
    /// Age segments passing the age facet.
    pub age_segments: Vec<AgeSegmentShare>,
    /// Every journey stage.
    pub journey_stages: Vec<JourneyStage>,
    /// Insights not tied to a hidden competitor.
    pub journey_insights: Vec<JourneyInsight>,
    /// Every action item.
    pub actions: Vec<ActionItem>,
    /// Price record of the scenario destination, projected but not faceted.
    pub scenario_prices: Option<PriceRecord>,
    /// Snapshot date.
    pub as_of: Option<NaiveDate>,
}

/// Applies `selection` to `store`.
#[must_use]
pub fn apply(store: &RecordStore, selection: &Selection) -> FilteredSubsets {
    let competitors = store.competitors();
    let reference = competitors.reference();
    let visible = selection.visible_competitors(competitors);
    let shown: BTreeSet<CompetitorId> = visible.iter().cloned().collect();
    let named_visible = |c: &Option<CompetitorId>| c.as_ref().map_or(true, |id| shown.contains(id));

    let destinations: Vec<Destination> = store
        .destinations()
        .iter()
        .filter(|d| shown.contains(&d.competitor) && destination_matches(d, selection))
        .cloned()
        .collect();

    let prices: Vec<PriceRecord> = store
        .prices()
        .iter()
        .filter(|p| price_record_matches(p, reference, selection))
        .map(|p| project_prices(p, &shown))
        .collect();

    let services = store
        .services()
        .iter()
        .map(|s| ServiceOffering {
            capabilities: s.capabilities.project(&shown),
            ..s.clone()
        })
        .collect();

    let sentiment = store
        .sentiment()
        .iter()
        .map(|s| SentimentScore {
            scores: s.scores.project(&shown),
            ..s.clone()
        })
        .collect();

    let radar = store
        .radar()
        .iter()
        .map(|a| RadarAxis {
            scores: a.scores.project(&shown),
            ..a.clone()
        })
        .collect();

    let keywords = store
        .keywords()
        .iter()
        .map(|k| KeywordRanking {
            positions: k.positions.project(&shown),
            ..k.clone()
        })
        .collect();

    let digital = store
        .digital()
        .iter()
        .map(|m| DigitalMetric {
            values: m.values.project(&shown),
            ..m.clone()
        })
        .collect();

    let nps = store
        .nps()
        .iter()
        .filter(|n| shown.contains(&n.competitor))
        .cloned()
        .collect();

    let swot = store
        .swot()
        .iter()
        .filter(|s| named_visible(&s.competitor))
        .cloned()
        .collect();

    let market_gaps = store
        .market_gaps()
        .iter()
        .filter(|g| named_visible(&g.competitor))
        .cloned()
        .collect();

    let journey_insights = store
        .journey_insights()
        .iter()
        .filter(|i| named_visible(&i.competitor))
        .cloned()
        .collect();

    let age_segments = store
        .age_segments()
        .iter()
        .filter(|s| selection.age().accepts(|band| *band == s.band))
        .cloned()
        .collect();

    let scenario_prices = selection
        .scenario()
        .and_then(|params| scenario_record(store.prices(), params))
        .map(|p| project_prices(p, &shown));

    let subsets = FilteredSubsets {
        reference: reference.clone(),
        visible,
        destinations,
        services,
        prices,
        sentiment,
        radar,
        keywords,
        digital,
        nps,
        swot,
        market_gaps,
        age_segments,
        journey_stages: store.journey_stages().to_vec(),
        journey_insights,
        actions: store.actions().to_vec(),
        scenario_prices,
        as_of: store.as_of(),
    };
    debug!(
        visible = subsets.visible.len(),
        destinations = subsets.destinations.len(),
        prices = subsets.prices.len(),
        swot = subsets.swot.len(),
        scenario = subsets.scenario_prices.is_some(),
        "filters applied"
    );
    subsets
}

/// Age AND program AND price band.
fn destination_matches(d: &Destination, selection: &Selection) -> bool {
    selection.age().accepts(|band| *band == d.age_band)
        && selection.program().accepts(|program| *program == d.program)
        && selection.price().accepts(|band| band.contains(d.price))
}

/// Program (vacuous when the record has none) AND price band on the
/// reference brand's price. A record without a reference price never
/// matches a concrete price band.
fn price_record_matches(p: &PriceRecord, reference: &CompetitorId, selection: &Selection) -> bool {
    let program_ok = selection
        .program()
        .accepts(|program| p.program.map_or(true, |own| own == *program));
    let price_ok = selection.price().accepts(|band| {
        p.prices
            .get(reference)
            .is_some_and(|price| band.contains(*price))
    });
    program_ok && price_ok
}

/// Price record for a scenario: same destination, preferring the record whose
/// program matches the scenario's program, then the first one in store order.
fn scenario_record<'a>(prices: &'a [PriceRecord], params: &ScenarioParams) -> Option<&'a PriceRecord> {
    let wanted = params.program.parse::<ProgramType>().ok();
    let mut candidates = prices.iter().filter(|p| p.destination == params.destination);
    let first = candidates.next()?;
    if wanted.is_none() || first.program == wanted {
        return Some(first);
    }
    Some(candidates.find(|p| p.program == wanted).unwrap_or(first))
}

fn project_prices(p: &PriceRecord, shown: &BTreeSet<CompetitorId>) -> PriceRecord {
    PriceRecord {
        prices: p.prices.project(shown),
        ..p.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::{Competitor, CompetitorValues};
    use crate::config::{EngineConfig, FacetConfig};
    use crate::facet::AgeBand;
    use crate::metrics::scenario::SimulationConfig;
    use crate::record::GeoPoint;
    use crate::store::RawRecords;

    fn destination(name: &str, competitor: &str, program: ProgramType, age: &str, price: f64) -> Destination {
        Destination {
            name: name.to_string(),
            region: "Europa".to_string(),
            location: GeoPoint { lat: 51.5, lon: -0.12 },
            competitor: CompetitorId::new(competitor),
            program,
            age_band: AgeBand::from(age),
            price,
        }
    }

    fn raw() -> RawRecords {
        RawRecords {
            reference: CompetitorId::new("giocamondo"),
            competitors: vec![
                Competitor::new("giocamondo", "Giocamondo Study", "#009CE0"),
                Competitor::new("ef", "EF Education First", "#EF476F"),
                Competitor::new("inter", "INTER Studioviaggi", "#FFD166"),
                Competitor::new("iter", "ITER", "#06D6A0"),
                Competitor::new("language", "Language Study", "#118AB2"),
            ],
            destinations: vec![
                destination("Londra (UK)", "giocamondo", ProgramType::Summer, "11-14", 2290.0),
                destination("Londra (UK)", "ef", ProgramType::Summer, "11-14", 2450.0),
                destination("Dublino (IE)", "inter", ProgramType::Summer, "15-18", 2190.0),
                destination("Boston (USA)", "language", ProgramType::Study, "18+", 3490.0),
                destination("Malta", "iter", ProgramType::Summer, "11-14", 990.0),
            ],
            prices: vec![
                PriceRecord {
                    destination: "Londra (UK)".to_string(),
                    program: Some(ProgramType::Summer),
                    prices: CompetitorValues::new()
                        .with("giocamondo", 2290.0)
                        .with("ef", 2450.0)
                        .with("language", 2190.0),
                },
                PriceRecord {
                    destination: "Boston (USA)".to_string(),
                    program: None,
                    prices: CompetitorValues::new()
                        .with("giocamondo", 3200.0)
                        .with("language", 3490.0),
                },
            ],
            swot: vec![
                SwotItem {
                    quadrant: crate::record::Quadrant::Threat,
                    title: "Price war".to_string(),
                    description: String::new(),
                    competitor: Some(CompetitorId::new("language")),
                },
                SwotItem {
                    quadrant: crate::record::Quadrant::Strength,
                    title: "Assistance 24/7".to_string(),
                    description: String::new(),
                    competitor: None,
                },
            ],
            ..RawRecords::default()
        }
    }

    fn store() -> RecordStore {
        RecordStore::load(raw(), &FacetConfig::default()).unwrap()
    }

    fn initial(store: &RecordStore) -> Selection {
        Selection::initial(store.competitors(), &EngineConfig::default())
    }

    #[test]
    fn default_selection_hides_unselected_competitors() {
        let store = store();
        let out = apply(&store, &initial(&store));
        assert_eq!(out.destinations.len(), 4);
        assert!(out.destinations.iter().all(|d| d.competitor.as_str() != "language"));
        let london = &out.prices[0];
        assert!(!london.prices.contains(&CompetitorId::new("language")));
        assert_eq!(out.swot.len(), 1);
    }

    #[test]
    fn facets_compose_by_and() {
        let store = store();
        let facets = FacetConfig::default();
        let sel = initial(&store)
            .with_age_filter("11-14", &facets)
            .unwrap()
            .with_price_filter("2000-3000", &facets)
            .unwrap();
        let out = apply(&store, &sel);
        let names: Vec<(&str, &str)> = out
            .destinations
            .iter()
            .map(|d| (d.name.as_str(), d.competitor.as_str()))
            .collect();
        assert_eq!(names, vec![("Londra (UK)", "giocamondo"), ("Londra (UK)", "ef")]);
    }

    #[test]
    fn price_record_without_program_passes_program_facet() {
        let store = store();
        let t = store.competitors();
        let sel = initial(&store)
            .toggle_competitor(&CompetitorId::new("language"), t)
            .unwrap()
            .with_program_filter("study")
            .unwrap();
        let out = apply(&store, &sel);
        assert_eq!(out.prices.len(), 1);
        assert_eq!(out.prices[0].destination, "Boston (USA)");
    }

    #[test]
    fn price_band_applies_to_reference_price() {
        let store = store();
        let sel = initial(&store)
            .with_price_filter("3000+", &FacetConfig::default())
            .unwrap();
        let out = apply(&store, &sel);
        assert_eq!(out.prices.len(), 1);
        assert_eq!(out.prices[0].destination, "Boston (USA)");
    }

    #[test]
    fn scenario_lookup_ignores_facets() {
        let store = store();
        let sel = initial(&store)
            .with_price_filter("0-1000", &FacetConfig::default())
            .unwrap()
            .with_scenario(
                ScenarioParams::new("Londra (UK)", "Explorer", 2290.0),
                &SimulationConfig::default(),
            )
            .unwrap();
        let out = apply(&store, &sel);
        assert!(out.prices.is_empty());
        let scenario = out.scenario_prices.unwrap();
        assert_eq!(scenario.prices.len(), 2);
    }

    #[test]
    fn scenario_lookup_prefers_matching_program() {
        let mut raw = raw();
        raw.prices.push(PriceRecord {
            destination: "Londra (UK)".to_string(),
            program: Some(ProgramType::Study),
            prices: CompetitorValues::new()
                .with("giocamondo", 2590.0)
                .with("ef", 2790.0),
        });
        let store = RecordStore::load(raw, &FacetConfig::default()).unwrap();
        let config = SimulationConfig::default();
        let lookup = |program: &str| {
            let sel = initial(&store)
                .with_scenario(ScenarioParams::new("Londra (UK)", program, 2500.0), &config)
                .unwrap();
            apply(&store, &sel).scenario_prices.unwrap()
        };

        assert_eq!(lookup("study").program, Some(ProgramType::Study));
        assert_eq!(lookup("study").prices.get(&CompetitorId::new("giocamondo")), Some(&2590.0));
        assert_eq!(lookup("summer").program, Some(ProgramType::Summer));
        // Not a program type: first record for the destination.
        assert_eq!(lookup("Explorer").program, Some(ProgramType::Summer));
    }

    #[test]
    fn filtering_is_idempotent() {
        let store = store();
        let sel = initial(&store);
        assert_eq!(apply(&store, &sel), apply(&store, &sel));
    }
}
