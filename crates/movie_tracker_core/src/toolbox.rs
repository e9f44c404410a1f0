//! crates/movie_tracker_core/src/toolbox.rs
//!
//! The declared tool set handed to the language model on every turn. The
//! orchestrator owns a `MovieToolbox` and passes it explicitly into the
//! model call; nothing is registered on shared/global state. Dispatch never
//! fails the turn — bad tool names or arguments come back as model-readable
//! error text.

use crate::agents::{KnowledgeAgent, RatingsAgent};
use crate::domain::{DiscoverFilter, EntityKind};
use crate::ports::{MovieCatalogService, MovieMetadataProvider};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// A declarative tool definition: name, description, and a JSON-schema
/// object describing the arguments.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

#[derive(Clone)]
pub struct MovieToolbox {
    catalog: Arc<dyn MovieCatalogService>,
    metadata: Arc<dyn MovieMetadataProvider>,
    ratings: RatingsAgent,
    knowledge: KnowledgeAgent,
}

#[derive(Deserialize)]
struct SearchMoviesArgs {
    movie_title: String,
    release_year: Option<i32>,
}

#[derive(Deserialize)]
struct SearchPeopleArgs {
    person_name: String,
}

#[derive(Deserialize)]
struct MovieDetailsArgs {
    movie_id: String,
}

#[derive(Deserialize)]
struct MovieRatingsArgs {
    imdb_id: String,
}

#[derive(Deserialize)]
struct RatingListArgs {
    imdb_ids: Vec<String>,
}

#[derive(Deserialize)]
struct FilterByRatingArgs {
    imdb_ids: Vec<String>,
    minimum_rating: f64,
}

#[derive(Deserialize)]
struct SearchKeywordsArgs {
    keyword: String,
}

#[derive(Deserialize)]
struct RelativeYearArgs {
    years_from_current: i32,
}

#[derive(Deserialize)]
struct RelativeMonthArgs {
    months_from_current: i32,
}

#[derive(Deserialize)]
struct RelativeDayArgs {
    days_from_current: i32,
}

#[derive(Deserialize)]
struct EntityContextArgs {
    entity_name: String,
    entity_type: Option<String>,
}

impl MovieToolbox {
    pub fn new(
        catalog: Arc<dyn MovieCatalogService>,
        metadata: Arc<dyn MovieMetadataProvider>,
        ratings: RatingsAgent,
        knowledge: KnowledgeAgent,
    ) -> Self {
        Self { catalog, metadata, ratings, knowledge }
    }

    /// The tool definitions advertised to the model.
    pub fn definitions(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "search_movies",
                description: "Search for movies by their title and optional release year. \
                              You can search by movie name or part of a movie name.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "movie_title": {
                            "type": "string",
                            "description": "The title of the movie, or part of the title"
                        },
                        "release_year": {
                            "type": "integer",
                            "description": "Optional: the year the movie was released"
                        }
                    },
                    "required": ["movie_title"]
                }),
            },
            ToolSpec {
                name: "get_genres_list",
                description: "Get the list of official genres for movies.",
                parameters: json!({ "type": "object", "properties": {} }),
            },
            ToolSpec {
                name: "search_people",
                description: "Search for people / cast by their name and also-known-as names.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "person_name": {
                            "type": "string",
                            "description": "The name of the person or cast member"
                        }
                    },
                    "required": ["person_name"]
                }),
            },
            ToolSpec {
                name: "search_keywords",
                description: "Search for keywords related to movies. The returned keyword ids \
                              can be used as keyword filters when discovering movies.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "keyword": {
                            "type": "string",
                            "description": "The name or partial name of the keyword"
                        }
                    },
                    "required": ["keyword"]
                }),
            },
            ToolSpec {
                name: "get_relative_year",
                description: "Gets a year relative to the current year. \
                              0 = current year, 1 = last year, 2 = two years ago, -1 = next year.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "years_from_current": {
                            "type": "integer",
                            "description": "How many years before the current year; negative goes forward"
                        }
                    },
                    "required": ["years_from_current"]
                }),
            },
            ToolSpec {
                name: "get_relative_month",
                description: "Gets a month relative to the current month, in YYYY-MM format. \
                              0 = current month, 1 = last month, -1 = next month.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "months_from_current": {
                            "type": "integer",
                            "description": "How many months before the current month; negative goes forward"
                        }
                    },
                    "required": ["months_from_current"]
                }),
            },
            ToolSpec {
                name: "get_relative_day",
                description: "Gets a day relative to today, in YYYY-MM-DD format. \
                              0 = today, 1 = yesterday, -1 = tomorrow.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "days_from_current": {
                            "type": "integer",
                            "description": "How many days before today; negative goes forward"
                        }
                    },
                    "required": ["days_from_current"]
                }),
            },
            ToolSpec {
                name: "discover_movies",
                description: "Discover movies based on release-date, cast, genre, keyword and \
                              vote filters.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "release_date_from": { "type": "string", "description": "Start release date (YYYY-MM-DD)" },
                        "release_date_to": { "type": "string", "description": "End release date (YYYY-MM-DD)" },
                        "cast_ids": { "type": "array", "items": { "type": "integer" } },
                        "genre_ids": { "type": "array", "items": { "type": "integer" } },
                        "keyword_ids": { "type": "array", "items": { "type": "integer" } },
                        "min_vote_average": { "type": "number" },
                        "max_vote_average": { "type": "number" },
                        "min_vote_count": { "type": "integer" },
                        "max_vote_count": { "type": "integer" }
                    }
                }),
            },
            ToolSpec {
                name: "get_movie_details",
                description: "Get detailed information about a specific movie by its id.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "movie_id": { "type": "string", "description": "The id of the movie" }
                    },
                    "required": ["movie_id"]
                }),
            },
            ToolSpec {
                name: "get_movie_ratings",
                description: "Get the IMDb, Rotten Tomatoes and Metacritic ratings plus box \
                              office for a movie by its IMDb id.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "imdb_id": { "type": "string", "description": "The IMDb id, e.g. tt1375666" }
                    },
                    "required": ["imdb_id"]
                }),
            },
            ToolSpec {
                name: "compare_movie_ratings",
                description: "Compare several movies by IMDb id and report the highest rated.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "imdb_ids": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["imdb_ids"]
                }),
            },
            ToolSpec {
                name: "filter_movies_by_rating",
                description: "Keep only the movies whose IMDb rating is at least the given \
                              minimum.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "imdb_ids": { "type": "array", "items": { "type": "string" } },
                        "minimum_rating": { "type": "number" }
                    },
                    "required": ["imdb_ids", "minimum_rating"]
                }),
            },
            ToolSpec {
                name: "get_entity_context",
                description: "Get encyclopedic context (summary, structured facts, confidence) \
                              about a movie, actor or director for richer answers.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "entity_name": { "type": "string" },
                        "entity_type": {
                            "type": "string",
                            "enum": ["movie", "actor", "director"]
                        }
                    },
                    "required": ["entity_name"]
                }),
            },
        ]
    }

    /// Executes one tool call and returns its result as a JSON string for
    /// the model. Unknown tools and undecodable arguments produce an error
    /// string rather than an error value.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> String {
        debug!(tool = name, "dispatching tool call");
        match self.try_dispatch(name, arguments).await {
            Ok(output) => output,
            Err(message) => {
                debug!(tool = name, error = %message, "tool call failed");
                json!({ "Error": message }).to_string()
            }
        }
    }

    async fn try_dispatch(&self, name: &str, arguments: &str) -> Result<String, String> {
        match name {
            "search_movies" => {
                let args: SearchMoviesArgs = decode_args(arguments)?;
                let results = self
                    .catalog
                    .search_movies(&args.movie_title, args.release_year)
                    .await
                    .map_err(|e| e.to_string())?;
                encode_output(&results)
            }
            "get_genres_list" => {
                let genres = self.catalog.genres_list().await.map_err(|e| e.to_string())?;
                encode_output(&genres)
            }
            "search_people" => {
                let args: SearchPeopleArgs = decode_args(arguments)?;
                let people = self
                    .catalog
                    .search_people(&args.person_name)
                    .await
                    .map_err(|e| e.to_string())?;
                encode_output(&people)
            }
            "search_keywords" => {
                let args: SearchKeywordsArgs = decode_args(arguments)?;
                let keywords = self
                    .catalog
                    .search_keywords(&args.keyword)
                    .await
                    .map_err(|e| e.to_string())?;
                encode_output(&keywords)
            }
            "get_relative_year" => {
                let args: RelativeYearArgs = decode_args(arguments)?;
                Ok(relative_year(Local::now().date_naive(), args.years_from_current))
            }
            "get_relative_month" => {
                let args: RelativeMonthArgs = decode_args(arguments)?;
                Ok(relative_month(Local::now().date_naive(), args.months_from_current))
            }
            "get_relative_day" => {
                let args: RelativeDayArgs = decode_args(arguments)?;
                Ok(relative_day(Local::now().date_naive(), args.days_from_current))
            }
            "discover_movies" => {
                let filter: DiscoverFilter = decode_args(arguments)?;
                let results = self
                    .catalog
                    .discover_movies(filter)
                    .await
                    .map_err(|e| e.to_string())?;
                encode_output(&results)
            }
            "get_movie_details" => {
                let args: MovieDetailsArgs = decode_args(arguments)?;
                let movie_id: i32 = args
                    .movie_id
                    .parse()
                    .map_err(|_| format!("movie_id {:?} is not a valid id", args.movie_id))?;
                let details = self
                    .metadata
                    .movie_details(movie_id)
                    .await
                    .map_err(|e| e.to_string())?;
                encode_output(&details)
            }
            "get_movie_ratings" => {
                let args: MovieRatingsArgs = decode_args(arguments)?;
                encode_output(&self.ratings.movie_ratings(&args.imdb_id).await)
            }
            "compare_movie_ratings" => {
                let args: RatingListArgs = decode_args(arguments)?;
                encode_output(&self.ratings.compare(&args.imdb_ids).await)
            }
            "filter_movies_by_rating" => {
                let args: FilterByRatingArgs = decode_args(arguments)?;
                encode_output(
                    &self
                        .ratings
                        .filter_by_rating(&args.imdb_ids, args.minimum_rating)
                        .await,
                )
            }
            "get_entity_context" => {
                let args: EntityContextArgs = decode_args(arguments)?;
                let kind = EntityKind::from_tag(args.entity_type.as_deref().unwrap_or("movie"));
                let snapshot = self.knowledge.lookup(&args.entity_name, kind).await;
                encode_output(&json!({
                    "Entity": snapshot.entity_name,
                    "Summary": snapshot.summary,
                    "Facts": snapshot.facts,
                    "Confidence": snapshot.confidence_score,
                }))
            }
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

//=========================================================================================
// Relative-Date Helpers
//=========================================================================================

// The offsets count backwards (1 = last year), matching the tool contract.

fn relative_year(today: NaiveDate, years_from_current: i32) -> String {
    (today.year() - years_from_current).to_string()
}

fn relative_month(today: NaiveDate, months_from_current: i32) -> String {
    let shifted = if months_from_current >= 0 {
        today.checked_sub_months(Months::new(months_from_current as u32))
    } else {
        today.checked_add_months(Months::new(months_from_current.unsigned_abs()))
    };
    shifted.unwrap_or(today).format("%Y-%m").to_string()
}

fn relative_day(today: NaiveDate, days_from_current: i32) -> String {
    let shifted = if days_from_current >= 0 {
        today.checked_sub_days(Days::new(u64::from(days_from_current as u32)))
    } else {
        today.checked_add_days(Days::new(u64::from(days_from_current.unsigned_abs())))
    };
    shifted.unwrap_or(today).format("%Y-%m-%d").to_string()
}

fn decode_args<'a, T: Deserialize<'a>>(arguments: &'a str) -> Result<T, String> {
    serde_json::from_str(arguments).map_err(|e| format!("invalid tool arguments: {e}"))
}

fn encode_output<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("failed to encode tool output: {e}"))
}
