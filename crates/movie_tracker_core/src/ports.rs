//! crates/movie_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete external services (document store,
//! shared cache, language model, movie and knowledge providers).

use crate::domain::{
    ChatSession, ConversationMessage, DiscoverFilter, EntityKind, GenreItem, KeywordItem,
    MovieSearchResult, MovieViewModel, PersonSearchResult, RatingResult, StructuredFacts,
};
use crate::toolbox::MovieToolbox;
use async_trait::async_trait;
use std::collections::BTreeMap;

//=========================================================================================
// Error Taxonomy
//=========================================================================================

/// The error taxonomy shared by all port operations.
///
/// `MalformedReply` and per-id enrichment failures are recovered locally by
/// the orchestrator; `Storage`, session `NotFound`, and a hard `Upstream`
/// failure from the primary model call abort the turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Malformed assistant reply: {0}")]
    MalformedReply(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A convenience type alias for `Result<T, ChatError>`.
pub type ChatResult<T> = Result<T, ChatError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// CRUD over persisted conversation state, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a brand-new session. Fails with `Storage` if the id already
    /// exists or the backing store is unreachable.
    async fn create(&self, session: ChatSession) -> ChatResult<ChatSession>;

    /// Loads a session. `NotFound` if no such id, `Storage` on transport
    /// failure.
    async fn get(&self, id: &str) -> ChatResult<ChatSession>;

    /// Replaces a session's history and supplementary fact in one write.
    /// Atomic from the caller's point of view; last writer wins (no
    /// optimistic concurrency check — concurrent turns on the same session
    /// can drop one side's update).
    async fn replace(
        &self,
        id: &str,
        history: &[ConversationMessage],
        funny_fact: Option<&str>,
    ) -> ChatResult<ChatSession>;
}

/// The language-model boundary.
#[async_trait]
pub trait ChatModelService: Send + Sync {
    /// Runs one model exchange over the full conversation history with the
    /// given tool set available, returning the model's final textual reply.
    async fn complete_with_tools(
        &self,
        history: &[ConversationMessage],
        toolbox: &MovieToolbox,
    ) -> ChatResult<String>;

    /// One-shot instruction + input prompt without history or tools.
    async fn prompt(&self, instructions: &str, input: &str) -> ChatResult<String>;
}

/// Movie-metadata provider keyed by the provider's native integer id.
#[async_trait]
pub trait MovieMetadataProvider: Send + Sync {
    async fn movie_details(&self, movie_id: i32) -> ChatResult<MovieViewModel>;
}

/// Movie-search operations exposed to the model as tools.
#[async_trait]
pub trait MovieCatalogService: Send + Sync {
    async fn search_movies(
        &self,
        title: &str,
        release_year: Option<i32>,
    ) -> ChatResult<Vec<MovieSearchResult>>;

    async fn genres_list(&self) -> ChatResult<Vec<GenreItem>>;

    async fn search_people(&self, name: &str) -> ChatResult<Vec<PersonSearchResult>>;

    /// Keyword lookup; the returned ids are what the discover filter's
    /// `keyword_ids` expects.
    async fn search_keywords(&self, query: &str) -> ChatResult<Vec<KeywordItem>>;

    async fn discover_movies(&self, filter: DiscoverFilter) -> ChatResult<Vec<MovieSearchResult>>;
}

/// Single-id ratings lookup. Normalizes every failure into a `RatingResult`
/// with `is_success == false` rather than returning an error.
#[async_trait]
pub trait RatingLookup: Send + Sync {
    async fn ratings_by_id(&self, imdb_id: &str) -> RatingResult;
}

/// Encyclopedic sub-fetches. Each degrades to `None` on failure; the
/// knowledge agent composes them into a snapshot.
#[async_trait]
pub trait EncyclopediaProvider: Send + Sync {
    async fn page_summary(&self, entity_name: &str) -> Option<String>;

    async fn structured_facts(
        &self,
        entity_name: &str,
        kind: EntityKind,
    ) -> Option<StructuredFacts>;

    async fn relevant_sections(
        &self,
        entity_name: &str,
        kind: EntityKind,
    ) -> Option<BTreeMap<String, String>>;
}

/// Byte-oriented shared cache keyed by movie id. Values are the serialized
/// `MovieViewModel`; expiry is whatever the backing cache enforces.
#[async_trait]
pub trait SharedCache: Send + Sync {
    async fn get(&self, key: &str) -> ChatResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> ChatResult<()>;
}
