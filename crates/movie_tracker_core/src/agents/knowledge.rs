//! crates/movie_tracker_core/src/agents/knowledge.rs
//!
//! The encyclopedic agent: composes the provider's summary, knowledge-graph,
//! and section sub-fetches into a single `KnowledgeSnapshot` with a
//! heuristic confidence score. An individual sub-fetch failing degrades to a
//! missing field; only a total miss produces an empty snapshot.

use crate::domain::{EntityKind, KnowledgeSnapshot};
use crate::ports::EncyclopediaProvider;
use std::sync::Arc;
use tracing::debug;

const SUMMARY_CONFIDENCE_THRESHOLD: usize = 100;

#[derive(Clone)]
pub struct KnowledgeAgent {
    provider: Arc<dyn EncyclopediaProvider>,
}

impl KnowledgeAgent {
    pub fn new(provider: Arc<dyn EncyclopediaProvider>) -> Self {
        Self { provider }
    }

    /// Gathers everything the provider knows about `entity_name`, scoped by
    /// entity type. The three sub-fetches run concurrently.
    pub async fn lookup(&self, entity_name: &str, kind: EntityKind) -> KnowledgeSnapshot {
        let (summary, structured, sections) = tokio::join!(
            self.provider.page_summary(entity_name),
            self.provider.structured_facts(entity_name, kind),
            self.provider.relevant_sections(entity_name, kind),
        );

        let (facts, related_entities) = structured
            .map(|s| (s.facts, s.related_entities))
            .unwrap_or_default();
        let sections = sections.unwrap_or_default();

        let confidence_score = confidence(summary.as_deref(), !facts.is_empty(), !sections.is_empty());
        debug!(
            entity = entity_name,
            confidence = confidence_score,
            "knowledge lookup complete"
        );

        KnowledgeSnapshot {
            entity_name: entity_name.to_string(),
            summary,
            facts,
            related_entities,
            sections,
            confidence_score,
        }
    }
}

/// +0.4 for a substantial summary, +0.4 for any structured facts, +0.2 for
/// any extracted sections, capped at 1.0.
fn confidence(summary: Option<&str>, has_facts: bool, has_sections: bool) -> f64 {
    let mut score: f64 = 0.0;
    if summary.map_or(false, |s| s.len() > SUMMARY_CONFIDENCE_THRESHOLD) {
        score += 0.4;
    }
    if has_facts {
        score += 0.4;
    }
    if has_sections {
        score += 0.2;
    }
    score.min(1.0)
}
