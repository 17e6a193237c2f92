//! Assembles a [`ViewModel`] from filtered subsets and their metrics.

use tracing::debug;

use crate::competitor::{CompetitorTable, CompetitorValues};
use crate::filter::FilteredSubsets;
use crate::metrics::{round1, Metric, Metrics};
use crate::record::{InsightKind, JourneyInsight};
use crate::selection::Selection;

use super::{
    ActionPlan, AgeSegmentRow, CompetitorColumn, DestinationPin, DigitalRow, JourneyNote,
    JourneyStageView, KeywordRow, MarketGapRow, MarketPanel, PriceMatrixRow, PricingRow, RadarRow,
    RegionGroup, ScenarioPanel, SentimentPanel, SentimentRow, ServiceCategory, ServiceRow,
    Surface, SurfaceKind, SwotBuckets, SwotEntry, ViewModel, ViewRequest,
};

/// Builds every surface.
#[must_use]
pub fn build(
    competitors: &CompetitorTable,
    subsets: &FilteredSubsets,
    metrics: &Metrics,
    selection: &Selection,
) -> ViewModel {
    build_with(competitors, subsets, metrics, selection, &ViewRequest::all())
}

/// Builds the surfaces named in `request`; the rest are `NotRequested`.
#[must_use]
pub fn build_with(
    competitors: &CompetitorTable,
    subsets: &FilteredSubsets,
    metrics: &Metrics,
    selection: &Selection,
    request: &ViewRequest,
) -> ViewModel {
    let b = Builder {
        subsets,
        metrics,
        request,
    };

    let view = ViewModel {
        version: ViewModel::VERSION,
        as_of: subsets.as_of,
        reference: subsets.reference.clone(),
        competitors: columns(competitors, subsets),
        destinations: b.surface(SurfaceKind::Destinations, Builder::destinations),
        radar: b.surface(SurfaceKind::Radar, Builder::radar),
        services: b.surface(SurfaceKind::Services, Builder::services),
        swot: b.surface(SurfaceKind::Swot, Builder::swot),
        sentiment: b.surface(SurfaceKind::Sentiment, Builder::sentiment),
        market: b.surface(SurfaceKind::Market, Builder::market),
        keywords: b.surface(SurfaceKind::Keywords, Builder::keywords),
        digital: b.surface(SurfaceKind::Digital, Builder::digital),
        pricing: b.surface(SurfaceKind::Pricing, Builder::pricing),
        price_matrix: b.surface(SurfaceKind::PriceMatrix, Builder::price_matrix),
        scenario: b.surface(SurfaceKind::Scenario, |b| b.scenario(selection)),
        journey: b.surface(SurfaceKind::Journey, Builder::journey),
        actions: b.surface(SurfaceKind::Actions, Builder::actions),
    };
    debug!(
        columns = view.competitors.len(),
        pricing_ready = view.pricing.is_ready(),
        scenario_ready = view.scenario.is_ready(),
        "view built"
    );
    view
}

fn columns(competitors: &CompetitorTable, subsets: &FilteredSubsets) -> Vec<CompetitorColumn> {
    subsets
        .visible
        .iter()
        .filter_map(|id| competitors.get(id))
        .map(|c| CompetitorColumn {
            id: c.id.clone(),
            name: c.name.clone(),
            color: c.color.clone(),
            is_reference: competitors.is_reference(&c.id),
        })
        .collect()
}

struct Builder<'a> {
    subsets: &'a FilteredSubsets,
    metrics: &'a Metrics,
    request: &'a ViewRequest,
}

impl Builder<'_> {
    /// `make` returns `None` when the surface has nothing to show.
    fn surface<T>(&self, kind: SurfaceKind, make: impl FnOnce(&Self) -> Option<T>) -> Surface<T> {
        if !self.request.contains(kind) {
            return Surface::NotRequested;
        }
        make(self).map_or(Surface::Empty, Surface::Ready)
    }

    fn destinations(&self) -> Option<Vec<RegionGroup>> {
        let mut groups: Vec<RegionGroup> = Vec::new();
        for d in &self.subsets.destinations {
            let pin = DestinationPin {
                name: d.name.clone(),
                location: d.location,
                competitor: d.competitor.clone(),
                program: d.program,
                age_band: d.age_band.clone(),
                price: d.price,
            };
            match groups.iter_mut().find(|g| g.region == d.region) {
                Some(group) => group.destinations.push(pin),
                None => groups.push(RegionGroup {
                    region: d.region.clone(),
                    destinations: vec![pin],
                }),
            }
        }
        non_empty(groups)
    }

    fn radar(&self) -> Option<Vec<RadarRow>> {
        let rows = self
            .subsets
            .radar
            .iter()
            .zip(&self.metrics.radar_gaps)
            .map(|(axis, gap)| RadarRow {
                subject: axis.subject.clone(),
                scores: axis.scores.clone(),
                gap: gap.clone(),
            })
            .collect();
        non_empty(rows)
    }

    fn services(&self) -> Option<Vec<ServiceCategory>> {
        let mut categories: Vec<ServiceCategory> = Vec::new();
        for s in &self.subsets.services {
            let row = ServiceRow {
                name: s.name.clone(),
                cells: s.capabilities.clone(),
            };
            match categories.iter_mut().find(|c| c.category == s.category) {
                Some(category) => category.rows.push(row),
                None => categories.push(ServiceCategory {
                    category: s.category.clone(),
                    rows: vec![row],
                }),
            }
        }
        non_empty(categories)
    }

    fn swot(&self) -> Option<SwotBuckets> {
        if self.subsets.swot.is_empty() {
            return None;
        }
        let mut buckets = SwotBuckets::default();
        for item in &self.subsets.swot {
            buckets.bucket_mut(item.quadrant).push(SwotEntry {
                title: item.title.clone(),
                description: item.description.clone(),
                competitor: item.competitor.clone(),
            });
        }
        Some(buckets)
    }

    fn sentiment(&self) -> Option<SentimentPanel> {
        if self.subsets.sentiment.is_empty() && self.subsets.nps.is_empty() {
            return None;
        }
        let series = self
            .subsets
            .sentiment
            .iter()
            .zip(&self.metrics.sentiment_gaps)
            .map(|(s, gap)| SentimentRow {
                category: s.category.clone(),
                scores: s.scores.clone(),
                gap: gap.clone(),
            })
            .collect();
        let nps: CompetitorValues<f64> = self
            .subsets
            .nps
            .iter()
            .map(|n| (n.competitor.clone(), n.score))
            .collect();
        Some(SentimentPanel {
            series,
            nps,
            summary: self.metrics.sentiment_summary.clone(),
        })
    }

    fn market(&self) -> Option<MarketPanel> {
        if self.subsets.market_gaps.is_empty() && self.subsets.age_segments.is_empty() {
            return None;
        }
        let mut gaps: Vec<MarketGapRow> = self
            .subsets
            .market_gaps
            .iter()
            .map(|g| MarketGapRow {
                segment: g.segment.clone(),
                description: g.description.clone(),
                potential: g.potential,
                competitor: g.competitor.clone(),
            })
            .collect();
        // Stable sort keeps store order among equal potentials.
        gaps.sort_by(|a, b| b.potential.cmp(&a.potential));
        let age_segments = self
            .subsets
            .age_segments
            .iter()
            .map(|s| AgeSegmentRow {
                band: s.band.clone(),
                current_share: s.current_share,
                potential_share: s.potential_share,
                headroom: round1(s.potential_share - s.current_share),
            })
            .collect();
        Some(MarketPanel { gaps, age_segments })
    }

    fn keywords(&self) -> Option<Vec<KeywordRow>> {
        let rows = self
            .subsets
            .keywords
            .iter()
            .zip(&self.metrics.keyword_gaps)
            .map(|(k, gap)| KeywordRow {
                keyword: k.keyword.clone(),
                monthly_volume: k.monthly_volume,
                positions: k.positions.clone(),
                gap: gap.clone(),
            })
            .collect();
        non_empty(rows)
    }

    fn digital(&self) -> Option<Vec<DigitalRow>> {
        let rows = self
            .subsets
            .digital
            .iter()
            .zip(&self.metrics.digital_diffs)
            .map(|(m, diffs)| DigitalRow {
                channel: m.channel.clone(),
                metric: m.metric.clone(),
                values: m.values.clone(),
                diffs: diffs.clone(),
            })
            .collect();
        non_empty(rows)
    }

    fn pricing(&self) -> Option<Vec<PricingRow>> {
        let rows = self
            .subsets
            .destinations
            .iter()
            .zip(&self.metrics.destination_diffs)
            .map(|(d, diff)| PricingRow {
                destination: d.name.clone(),
                competitor: d.competitor.clone(),
                program: d.program,
                age_band: d.age_band.clone(),
                price: d.price,
                diff_pct: diff.clone(),
            })
            .collect();
        non_empty(rows)
    }

    fn price_matrix(&self) -> Option<Vec<PriceMatrixRow>> {
        let rows = self
            .subsets
            .prices
            .iter()
            .zip(&self.metrics.price_rows)
            .map(|(p, m)| PriceMatrixRow {
                destination: p.destination.clone(),
                program: p.program,
                prices: p.prices.clone(),
                diffs: m.competitor_diffs.clone(),
                mean_diff: m.mean_diff.clone(),
                gap: m.gap.clone(),
            })
            .collect();
        non_empty(rows)
    }

    fn scenario(&self, selection: &Selection) -> Option<ScenarioPanel> {
        let params = selection.scenario()?;
        Some(ScenarioPanel {
            params: params.clone(),
            outcome: self
                .metrics
                .scenario
                .clone()
                .unwrap_or(Metric::NotApplicable),
        })
    }

    fn journey(&self) -> Option<Vec<JourneyStageView>> {
        let notes = |stage: &str, kind: InsightKind| -> Vec<JourneyNote> {
            self.subsets
                .journey_insights
                .iter()
                .filter(|i| i.stage == stage && i.kind == kind)
                .map(note)
                .collect()
        };
        let stages = self
            .subsets
            .journey_stages
            .iter()
            .map(|s| JourneyStageView {
                name: s.name.clone(),
                description: s.description.clone(),
                touchpoints: s.touchpoints.clone(),
                frictions: notes(&s.name, InsightKind::Friction),
                advantages: notes(&s.name, InsightKind::Advantage),
            })
            .collect();
        non_empty(stages)
    }

    fn actions(&self) -> Option<ActionPlan> {
        if self.subsets.actions.is_empty() {
            return None;
        }
        let mut plan = ActionPlan::default();
        for a in &self.subsets.actions {
            plan.bucket_mut(a.horizon).push(a.description.clone());
        }
        Some(plan)
    }
}

fn note(i: &JourneyInsight) -> JourneyNote {
    JourneyNote {
        kind: i.kind,
        title: i.title.clone(),
        description: i.description.clone(),
        impact: i.impact,
        action: i.action.clone(),
        competitor: i.competitor.clone(),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
