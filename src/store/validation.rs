//! Snapshot validation.
//!
//! Every record is checked against the competitor table and the configured
//! facets before it enters a store. Checks stop at the first failure.

use std::collections::HashSet;

use crate::competitor::{Competitor, CompetitorId, CompetitorTable, CompetitorValues};
use crate::config::FacetConfig;
use crate::error::{RecordKind, RecordRef, SchemaError};
use crate::facet::AgeBand;
use crate::record::{
    ActionItem, AgeSegmentShare, Destination, DigitalMetric, JourneyInsight, JourneyStage,
    KeywordRanking, MarketGap, NpsScore, PriceRecord, RadarAxis, SentimentScore, ServiceOffering,
    SwotItem,
};

const SENTIMENT_RANGE: (f64, f64) = (0.0, 100.0);
const RADAR_RANGE: (f64, f64) = (0.0, 10.0);
const NPS_RANGE: (f64, f64) = (-100.0, 100.0);
const SHARE_RANGE: (f64, f64) = (0.0, 100.0);

/// Builds the competitor table, rejecting duplicate ids and an unknown reference.
pub(super) fn competitor_table(
    entries: Vec<Competitor>,
    reference: CompetitorId,
) -> Result<CompetitorTable, SchemaError> {
    let mut seen = HashSet::new();
    for (i, c) in entries.iter().enumerate() {
        if c.id.as_str().trim().is_empty() {
            return Err(SchemaError::EmptyField {
                record: RecordRef::new(RecordKind::Competitor, i, c.name.clone()),
                field: "id",
            });
        }
        if !seen.insert(c.id.clone()) {
            return Err(SchemaError::DuplicateCompetitor {
                id: c.id.to_string(),
            });
        }
    }
    if !seen.contains(&reference) {
        return Err(SchemaError::UnknownReferenceBrand {
            id: reference.to_string(),
        });
    }
    Ok(CompetitorTable::new(entries, reference))
}

fn non_empty(record: &RecordRef, field: &'static str, value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::EmptyField {
            record: record.clone(),
            field,
        });
    }
    Ok(())
}

fn in_range(
    record: &RecordRef,
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), SchemaError> {
    if !value.is_finite() || value < min || value > max {
        return Err(SchemaError::OutOfRange {
            record: record.clone(),
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn non_negative(record: &RecordRef, field: &'static str, value: f64) -> Result<(), SchemaError> {
    in_range(record, field, value, (0.0, f64::MAX))
}

pub(super) struct Context<'a> {
    pub competitors: &'a CompetitorTable,
    pub facets: &'a FacetConfig,
}

impl Context<'_> {
    fn known(&self, record: &RecordRef, id: &CompetitorId) -> Result<(), SchemaError> {
        if self.competitors.contains(id) {
            Ok(())
        } else {
            Err(SchemaError::UnknownCompetitor {
                record: record.clone(),
                competitor: id.to_string(),
            })
        }
    }

    fn known_optional(
        &self,
        record: &RecordRef,
        id: Option<&CompetitorId>,
    ) -> Result<(), SchemaError> {
        id.map_or(Ok(()), |id| self.known(record, id))
    }

    /// Every key known; optionally the reference entry required.
    fn keys<T>(
        &self,
        record: &RecordRef,
        values: &CompetitorValues<T>,
        require_reference: bool,
    ) -> Result<(), SchemaError> {
        for id in values.keys() {
            self.known(record, id)?;
        }
        if require_reference && !values.contains(self.competitors.reference()) {
            return Err(SchemaError::MissingReferenceEntry {
                record: record.clone(),
                reference: self.competitors.reference().to_string(),
            });
        }
        Ok(())
    }

    fn age_band(&self, record: &RecordRef, band: &AgeBand) -> Result<(), SchemaError> {
        if self.facets.age_band(band.as_str()).is_some() {
            Ok(())
        } else {
            Err(SchemaError::UnknownAgeBand {
                record: record.clone(),
                band: band.to_string(),
            })
        }
    }

    pub fn destinations(&self, items: &[Destination]) -> Result<(), SchemaError> {
        for (i, d) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Destination, i, d.name.clone());
            non_empty(&r, "name", &d.name)?;
            self.known(&r, &d.competitor)?;
            self.age_band(&r, &d.age_band)?;
            non_negative(&r, "price", d.price)?;
            in_range(&r, "lat", d.location.lat, (-90.0, 90.0))?;
            in_range(&r, "lon", d.location.lon, (-180.0, 180.0))?;
        }
        Ok(())
    }

    pub fn services(&self, items: &[ServiceOffering]) -> Result<(), SchemaError> {
        for (i, s) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Service, i, s.name.clone());
            non_empty(&r, "name", &s.name)?;
            self.keys(&r, &s.capabilities, true)?;
        }
        Ok(())
    }

    pub fn prices(&self, items: &[PriceRecord]) -> Result<(), SchemaError> {
        for (i, p) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Price, i, p.destination.clone());
            non_empty(&r, "destination", &p.destination)?;
            self.keys(&r, &p.prices, true)?;
            for (_, price) in p.prices.iter() {
                non_negative(&r, "price", *price)?;
            }
        }
        Ok(())
    }

    pub fn sentiment(&self, items: &[SentimentScore]) -> Result<(), SchemaError> {
        for (i, s) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Sentiment, i, s.category.clone());
            non_empty(&r, "category", &s.category)?;
            self.keys(&r, &s.scores, false)?;
            for (_, score) in s.scores.iter() {
                in_range(&r, "score", *score, SENTIMENT_RANGE)?;
            }
        }
        Ok(())
    }

    pub fn radar(&self, items: &[RadarAxis]) -> Result<(), SchemaError> {
        for (i, a) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Radar, i, a.subject.clone());
            non_empty(&r, "subject", &a.subject)?;
            self.keys(&r, &a.scores, false)?;
            for (_, score) in a.scores.iter() {
                in_range(&r, "score", *score, RADAR_RANGE)?;
            }
        }
        Ok(())
    }

    pub fn keywords(&self, items: &[KeywordRanking]) -> Result<(), SchemaError> {
        for (i, k) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Keyword, i, k.keyword.clone());
            non_empty(&r, "keyword", &k.keyword)?;
            self.keys(&r, &k.positions, false)?;
            for (_, position) in k.positions.iter() {
                in_range(&r, "position", f64::from(*position), (1.0, f64::from(u32::MAX)))?;
            }
        }
        Ok(())
    }

    pub fn digital(&self, items: &[DigitalMetric]) -> Result<(), SchemaError> {
        for (i, m) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Digital, i, format!("{}/{}", m.channel, m.metric));
            non_empty(&r, "channel", &m.channel)?;
            non_empty(&r, "metric", &m.metric)?;
            self.keys(&r, &m.values, false)?;
            for (_, value) in m.values.iter() {
                non_negative(&r, "value", *value)?;
            }
        }
        Ok(())
    }

    pub fn nps(&self, items: &[NpsScore]) -> Result<(), SchemaError> {
        for (i, n) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Nps, i, n.competitor.to_string());
            self.known(&r, &n.competitor)?;
            in_range(&r, "score", n.score, NPS_RANGE)?;
        }
        Ok(())
    }

    pub fn swot(&self, items: &[SwotItem]) -> Result<(), SchemaError> {
        for (i, s) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Swot, i, s.title.clone());
            non_empty(&r, "title", &s.title)?;
            self.known_optional(&r, s.competitor.as_ref())?;
        }
        Ok(())
    }

    pub fn market_gaps(&self, items: &[MarketGap]) -> Result<(), SchemaError> {
        for (i, g) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::MarketGap, i, g.segment.clone());
            non_empty(&r, "segment", &g.segment)?;
            self.known_optional(&r, g.competitor.as_ref())?;
        }
        Ok(())
    }

    pub fn age_segments(&self, items: &[AgeSegmentShare]) -> Result<(), SchemaError> {
        for (i, s) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::AgeSegment, i, s.band.to_string());
            self.age_band(&r, &s.band)?;
            in_range(&r, "current_share", s.current_share, SHARE_RANGE)?;
            in_range(&r, "potential_share", s.potential_share, SHARE_RANGE)?;
        }
        Ok(())
    }

    pub fn journey(
        &self,
        stages: &[JourneyStage],
        insights: &[JourneyInsight],
    ) -> Result<(), SchemaError> {
        for (i, s) in stages.iter().enumerate() {
            let r = RecordRef::new(RecordKind::JourneyStage, i, s.name.clone());
            non_empty(&r, "name", &s.name)?;
        }
        for (i, insight) in insights.iter().enumerate() {
            let r = RecordRef::new(RecordKind::JourneyInsight, i, insight.title.clone());
            non_empty(&r, "title", &insight.title)?;
            if !stages.iter().any(|s| s.name == insight.stage) {
                return Err(SchemaError::UnknownJourneyStage {
                    record: r,
                    stage: insight.stage.clone(),
                });
            }
            self.known_optional(&r, insight.competitor.as_ref())?;
        }
        Ok(())
    }

    pub fn actions(&self, items: &[ActionItem]) -> Result<(), SchemaError> {
        for (i, a) in items.iter().enumerate() {
            let r = RecordRef::new(RecordKind::Action, i, a.description.clone());
            non_empty(&r, "description", &a.description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CompetitorTable {
        competitor_table(
            vec![
                Competitor::new("ref", "Reference", ""),
                Competitor::new("ef", "EF", ""),
            ],
            CompetitorId::new("ref"),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_competitor_is_rejected() {
        let err = competitor_table(
            vec![Competitor::new("ef", "EF", ""), Competitor::new("ef", "EF again", "")],
            CompetitorId::new("ef"),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateCompetitor { .. }));
    }

    #[test]
    fn sentiment_out_of_range_is_rejected() {
        let competitors = table();
        let facets = FacetConfig::default();
        let ctx = Context {
            competitors: &competitors,
            facets: &facets,
        };
        let items = vec![SentimentScore {
            category: "Staff".to_string(),
            scores: CompetitorValues::new().with("ref", 101.0),
        }];
        let err = ctx.sentiment(&items).unwrap_err();
        assert!(matches!(err, SchemaError::OutOfRange { field: "score", .. }));
    }

    #[test]
    fn sentiment_may_omit_reference() {
        let competitors = table();
        let facets = FacetConfig::default();
        let ctx = Context {
            competitors: &competitors,
            facets: &facets,
        };
        let items = vec![SentimentScore {
            category: "Valore".to_string(),
            scores: CompetitorValues::new().with("ef", 72.0),
        }];
        ctx.sentiment(&items).unwrap();
    }

    #[test]
    fn service_requires_reference_entry() {
        let competitors = table();
        let facets = FacetConfig::default();
        let ctx = Context {
            competitors: &competitors,
            facets: &facets,
        };
        let items = vec![ServiceOffering {
            category: "Servizi".to_string(),
            name: "App Mobile Dedicata".to_string(),
            capabilities: CompetitorValues::new()
                .with("ef", crate::record::Capability::Text("Sì (avanzata)".to_string())),
        }];
        let err = ctx.services(&items).unwrap_err();
        assert_eq!(err.record().map(|r| r.kind), Some(RecordKind::Service));
    }

    #[test]
    fn keyword_position_zero_is_rejected() {
        let competitors = table();
        let facets = FacetConfig::default();
        let ctx = Context {
            competitors: &competitors,
            facets: &facets,
        };
        let items = vec![KeywordRanking {
            keyword: "summer camp italia".to_string(),
            monthly_volume: 6800,
            positions: CompetitorValues::new().with("ref", 0),
        }];
        assert!(ctx.keywords(&items).is_err());
    }

    #[test]
    fn insight_must_name_existing_stage() {
        let competitors = table();
        let facets = FacetConfig::default();
        let ctx = Context {
            competitors: &competitors,
            facets: &facets,
        };
        let stages = vec![JourneyStage {
            name: "Scoperta".to_string(),
            description: String::new(),
            touchpoints: vec!["Google/SEO".to_string()],
        }];
        let insights = vec![JourneyInsight {
            stage: "Acquisto".to_string(),
            kind: crate::record::InsightKind::Advantage,
            title: "Flessibilità pagamenti".to_string(),
            description: String::new(),
            impact: crate::metrics::gap::Severity::High,
            action: String::new(),
            competitor: None,
        }];
        let err = ctx.journey(&stages, &insights).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownJourneyStage { .. }));
    }
}
