//! services/api/tests/common/mod.rs
//!
//! In-memory port doubles and fixture assembly shared by the integration
//! tests. Each test binary compiles its own copy, so not every double is
//! used everywhere.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::state::AppState;
use async_trait::async_trait;
use movie_tracker_core::agents::{FactGenerator, KnowledgeAgent, RatingsAgent};
use movie_tracker_core::domain::{
    ChatSession, ConversationMessage, DiscoverFilter, EntityKind, GenreItem, KeywordItem,
    MovieSearchResult, MovieViewModel, PersonSearchResult, RatingResult, StructuredFacts,
};
use movie_tracker_core::movie_cache::MovieCache;
use movie_tracker_core::ports::{
    ChatError, ChatModelService, ChatResult, EncyclopediaProvider, MovieCatalogService,
    MovieMetadataProvider, RatingLookup, SessionStore, SharedCache,
};
use movie_tracker_core::toolbox::MovieToolbox;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::Level;

//=========================================================================================
// Port Doubles
//=========================================================================================

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ChatSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: ChatSession) -> ChatResult<ChatSession> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.id) {
            return Err(ChatError::Storage(format!(
                "duplicate session id {}",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> ChatResult<ChatSession> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(format!("Chat session {} not found", id)))
    }

    async fn replace(
        &self,
        id: &str,
        history: &[ConversationMessage],
        funny_fact: Option<&str>,
    ) -> ChatResult<ChatSession> {
        let mut sessions = self.sessions.lock().unwrap();
        let stored = sessions
            .get_mut(id)
            .ok_or_else(|| ChatError::NotFound(format!("Chat session {} not found", id)))?;
        stored.history = history.to_vec();
        stored.funny_fact = funny_fact.map(str::to_string);
        Ok(stored.clone())
    }
}

/// Model double: `prompt` and `complete_with_tools` each pop their scripted
/// replies in order, so multi-turn tests can script every exchange.
pub struct ScriptedModel {
    prompt_replies: Mutex<Vec<ChatResult<String>>>,
    completions: Mutex<Vec<ChatResult<String>>>,
}

impl ScriptedModel {
    pub fn new(
        prompt_replies: Vec<ChatResult<String>>,
        completions: Vec<ChatResult<String>>,
    ) -> Self {
        Self {
            prompt_replies: Mutex::new(prompt_replies),
            completions: Mutex::new(completions),
        }
    }
}

#[async_trait]
impl ChatModelService for ScriptedModel {
    async fn complete_with_tools(
        &self,
        _history: &[ConversationMessage],
        _toolbox: &MovieToolbox,
    ) -> ChatResult<String> {
        let mut completions = self.completions.lock().unwrap();
        assert!(!completions.is_empty(), "completions already consumed");
        completions.remove(0)
    }

    async fn prompt(&self, _instructions: &str, _input: &str) -> ChatResult<String> {
        self.prompt_replies.lock().unwrap().remove(0)
    }
}

pub struct StubMetadata;

#[async_trait]
impl MovieMetadataProvider for StubMetadata {
    async fn movie_details(&self, movie_id: i32) -> ChatResult<MovieViewModel> {
        if movie_id == 603 {
            return Err(ChatError::Upstream("metadata service down".to_string()));
        }
        Ok(MovieViewModel {
            poster_path: None,
            adult: false,
            overview: "An overview".to_string(),
            release_date: Some("2010-07-16".to_string()),
            genre_ids: vec![28],
            id: movie_id.to_string(),
            original_title: "Inception".to_string(),
            original_language: "en".to_string(),
            title: "Inception".to_string(),
            backdrop_path: None,
            popularity: 83.5,
            vote_count: 34000,
            favorite: false,
            vote_average: 8.4,
            imdb_id: "tt1375666".to_string(),
        })
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SharedCache for MemoryCache {
    async fn get(&self, key: &str) -> ChatResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct EmptyCatalog;

#[async_trait]
impl MovieCatalogService for EmptyCatalog {
    async fn search_movies(
        &self,
        _title: &str,
        _release_year: Option<i32>,
    ) -> ChatResult<Vec<MovieSearchResult>> {
        Ok(vec![])
    }

    async fn genres_list(&self) -> ChatResult<Vec<GenreItem>> {
        Ok(vec![])
    }

    async fn search_people(&self, _name: &str) -> ChatResult<Vec<PersonSearchResult>> {
        Ok(vec![])
    }

    async fn search_keywords(&self, _query: &str) -> ChatResult<Vec<KeywordItem>> {
        Ok(vec![])
    }

    async fn discover_movies(&self, _filter: DiscoverFilter) -> ChatResult<Vec<MovieSearchResult>> {
        Ok(vec![])
    }
}

pub struct EmptyRatings;

#[async_trait]
impl RatingLookup for EmptyRatings {
    async fn ratings_by_id(&self, imdb_id: &str) -> RatingResult {
        RatingResult::failure(format!("Movie not found for IMDb ID: {imdb_id}"))
    }
}

pub struct CannedEncyclopedia {
    pub rich: bool,
}

#[async_trait]
impl EncyclopediaProvider for CannedEncyclopedia {
    async fn page_summary(&self, _entity_name: &str) -> Option<String> {
        self.rich.then(|| {
            "Thomas Jeffrey Hanks is an American actor and filmmaker, known for both his \
             comedic and dramatic roles across five decades of cinema."
                .to_string()
        })
    }

    async fn structured_facts(
        &self,
        _entity_name: &str,
        _kind: EntityKind,
    ) -> Option<StructuredFacts> {
        self.rich.then(|| StructuredFacts {
            facts: BTreeMap::from([("Birth Date".to_string(), "1956-07-09".to_string())]),
            related_entities: vec![],
        })
    }

    async fn relevant_sections(
        &self,
        _entity_name: &str,
        _kind: EntityKind,
    ) -> Option<BTreeMap<String, String>> {
        None
    }
}

//=========================================================================================
// Fixture Assembly
//=========================================================================================

pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        redis_url: String::new(),
        log_level: Level::INFO,
        openai_api_key: None,
        tmdb_api_key: None,
        omdb_api_key: None,
        chat_model: "gpt-4o".to_string(),
        fact_model: "gpt-4o-mini".to_string(),
        movie_cache_ttl_seconds: None,
    })
}

pub fn app_state(model: ScriptedModel, rich_encyclopedia: bool) -> AppState {
    let model: Arc<dyn ChatModelService> = Arc::new(model);
    let knowledge = KnowledgeAgent::new(Arc::new(CannedEncyclopedia {
        rich: rich_encyclopedia,
    }));
    let metadata: Arc<dyn MovieMetadataProvider> = Arc::new(StubMetadata);
    AppState {
        sessions: Arc::new(MemorySessionStore::default()),
        chat_model: model.clone(),
        fact_generator: FactGenerator::new(model, knowledge.clone()),
        movie_cache: MovieCache::new(Arc::new(MemoryCache::default()), metadata.clone()),
        toolbox: MovieToolbox::new(
            Arc::new(EmptyCatalog),
            metadata,
            RatingsAgent::new(Arc::new(EmptyRatings)),
            knowledge,
        ),
        config: test_config(),
    }
}

pub const STRUCTURED_REPLY: &str =
    r#"{"message":"Here you go","movies":[{"id":"27205","name":"Inception"}]}"#;
