//! crates/movie_tracker_core/src/domain.rs
//!
//! Defines the core data structures for the application: the persisted
//! conversation state, the structured contract the model is asked to honor,
//! and the enrichment records produced by the knowledge agents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A persisted conversation, keyed by its short opaque id.
///
/// The id doubles as the storage partition key. History is append-only from
/// the orchestrator's point of view; `funny_fact` is a single slot that is
/// overwritten on every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub history: Vec<ConversationMessage>,
    pub funny_fact: Option<String>,
}

impl ChatSession {
    /// Creates a fresh session seeded with the system instruction.
    pub fn new(id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: vec![ConversationMessage::system(system_prompt)],
            funny_fact: None,
        }
    }
}

/// One entry of a session's history, tagged by author role.
///
/// Insertion order within a session is the source of truth for replay.
/// System and Tool messages are never surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationMessage {
    System { content: String },
    User { content: String },
    Assistant { content: String },
    Tool { content: String },
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User { content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant { content: content.into() }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::Tool { content: content.into() }
    }
}

/// The JSON shape the model is instructed to produce on every reply.
///
/// This is untrusted input: the model may wrap it in code fences, drop
/// fields, or emit free text. See [`crate::reply::parse_assistant_reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAssistantReply {
    pub message: String,
    pub movies: Vec<MovieReference>,
}

/// A movie reference as emitted by the model: an opaque id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieReference {
    pub id: String,
    pub name: String,
}

/// The canonical enriched movie record served to clients.
///
/// Created by the metadata cache on first resolution of a movie id and
/// re-derived identically afterwards; `id` is the stable cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieViewModel {
    pub poster_path: Option<String>,
    pub adult: bool,
    pub overview: String,
    pub release_date: Option<String>,
    pub genre_ids: Vec<i32>,
    pub id: String,
    pub original_title: String,
    pub original_language: String,
    pub title: String,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_count: i64,
    /// Always false at creation; ownership passes to the client afterwards.
    pub favorite: bool,
    pub vote_average: f64,
    /// External rating identifier (IMDb-style); may be empty.
    pub imdb_id: String,
}

/// Per-movie outcome from the ratings agent. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingResult {
    pub title: String,
    pub year: String,
    pub imdb_rating: String,
    pub rotten_tomatoes_rating: String,
    pub metacritic_rating: String,
    pub box_office: String,
    pub is_success: bool,
    pub error_message: String,
}

impl RatingResult {
    /// A failed lookup carrying only a human-readable error message.
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            year: String::new(),
            imdb_rating: String::new(),
            rotten_tomatoes_rating: String::new(),
            metacritic_rating: String::new(),
            box_office: String::new(),
            is_success: false,
            error_message: error_message.into(),
        }
    }
}

/// Outcome of comparing several movies by their primary rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatingComparison {
    pub highest_rated_title: String,
    pub highest_rating: String,
    pub all_movies: Vec<RatingResult>,
    pub is_success: bool,
    pub error_message: String,
}

/// The kind of named entity the encyclopedic agent is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Movie,
    Actor,
    Director,
}

impl EntityKind {
    /// Parses the model-facing type tag, defaulting to `Movie`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "actor" => Self::Actor,
            "director" => Self::Director,
            _ => Self::Movie,
        }
    }
}

/// Structured facts and related entities extracted from the knowledge graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFacts {
    pub facts: BTreeMap<String, String>,
    pub related_entities: Vec<String>,
}

/// Per-entity enrichment bundle. Ephemeral, computed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub entity_name: String,
    pub summary: Option<String>,
    pub facts: BTreeMap<String, String>,
    pub related_entities: Vec<String>,
    pub sections: BTreeMap<String, String>,
    /// Heuristic measure of how much enrichment data was gathered, in [0, 1].
    pub confidence_score: f64,
}

/// One row of a movie search, as surfaced to the model by the catalog tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieSearchResult {
    pub movie_id: String,
    pub movie_name: String,
    pub release_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenreItem {
    pub genre_id: String,
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonSearchResult {
    pub person_id: String,
    pub person_name: String,
}

/// One keyword row; its id feeds the `keyword_ids` discover filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeywordItem {
    pub keyword_id: String,
    pub name: String,
}

/// Filters accepted by the discover tool. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscoverFilter {
    pub release_date_from: Option<String>,
    pub release_date_to: Option<String>,
    pub cast_ids: Option<Vec<i32>>,
    pub genre_ids: Option<Vec<i32>>,
    pub keyword_ids: Option<Vec<i32>>,
    pub min_vote_average: Option<f64>,
    pub max_vote_average: Option<f64>,
    pub min_vote_count: Option<i32>,
    pub max_vote_count: Option<i32>,
}
