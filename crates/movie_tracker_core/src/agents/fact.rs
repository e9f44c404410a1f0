//! crates/movie_tracker_core/src/agents/fact.rs
//!
//! Entity detection and funny-fact generation. The model first extracts a
//! single named entity (or the sentinel "NONE") from the raw user input; a
//! detected entity is then enriched through the knowledge agent, and the
//! fact is synthesized grounded in the retrieved summary when confidence is
//! high enough, or from the model's own knowledge otherwise.

use crate::agents::knowledge::KnowledgeAgent;
use crate::domain::EntityKind;
use crate::ports::{ChatModelService, ChatResult};
use std::sync::Arc;
use tracing::debug;

const ENTITY_DETECTION_INSTRUCTIONS: &str = r#"Analyze the user query and determine if it mentions specific:
1. Actors/actresses by name
2. Movie titles
3. Directors

Return ONLY the name of the specific entity mentioned, or 'NONE' if no specific entities are found.
For generic queries like 'action movies' or 'comedies', return 'NONE'.

Examples:
Query: 'list movies with tom hanks in 90s' -> 'Tom Hanks'
Query: 'show me the matrix movies' -> 'The Matrix'
Query: 'what popular movies came out last year' -> 'NONE'
Query: 'movies directed by Christopher Nolan' -> 'Christopher Nolan'"#;

const GROUNDED_FACT_INSTRUCTIONS: &str = r#"You will be given an entity name and a Wikipedia summary about it.
Generate ONE surprising, entertaining fact that most people wouldn't know, grounded in the summary.
Keep it under 100 characters and make it engaging for movie fans.
Reply with the fact only."#;

const BASIC_FACT_INSTRUCTIONS: &str = r#"Generate ONE interesting, entertaining, or funny fact about the given entity.
The fact should be concise, surprising, and relevant to movies or acting if possible.
Keep it under 100 characters. Reply with the fact only.

Examples:
- Tom Hanks collects vintage typewriters and owns over 250 of them!
- The Matrix's famous green code is actually sushi recipes in Japanese.
- Christopher Nolan doesn't use email or a smartphone."#;

/// Confidence above which the fact is grounded in the retrieved summary.
const GROUNDING_THRESHOLD: f64 = 0.5;

#[derive(Clone)]
pub struct FactGenerator {
    model: Arc<dyn ChatModelService>,
    knowledge: KnowledgeAgent,
}

impl FactGenerator {
    pub fn new(model: Arc<dyn ChatModelService>, knowledge: KnowledgeAgent) -> Self {
        Self { model, knowledge }
    }

    /// Produces a supplementary fact for the turn, or `None` when the input
    /// mentions no specific entity or the fact comes back empty.
    ///
    /// The only error surfaced is a model-call failure; the orchestrator
    /// treats it as a soft failure and continues the turn without a fact.
    pub async fn funny_fact(&self, user_input: &str) -> ChatResult<Option<String>> {
        let detected = self
            .model
            .prompt(ENTITY_DETECTION_INSTRUCTIONS, user_input)
            .await?;
        let entity = detected.trim().trim_matches('\'').trim();

        if entity.is_empty() || entity.eq_ignore_ascii_case("NONE") {
            debug!("no entity detected; skipping fact generation");
            return Ok(None);
        }

        let snapshot = self.knowledge.lookup(entity, EntityKind::Movie).await;

        let fact = if snapshot.confidence_score > GROUNDING_THRESHOLD {
            let grounded_input = format!(
                "Entity: {}\nSummary: {}",
                entity,
                snapshot.summary.as_deref().unwrap_or_default()
            );
            self.model
                .prompt(GROUNDED_FACT_INSTRUCTIONS, &grounded_input)
                .await?
        } else {
            self.model.prompt(BASIC_FACT_INSTRUCTIONS, entity).await?
        };

        let fact = fact.trim();
        if fact.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fact.to_string()))
        }
    }
}
