//! services/api/src/adapters/tmdb.rs
//!
//! Movie-catalog adapter backed by The Movie Database HTTP API. Implements
//! both the `MovieMetadataProvider` port (single-movie detail lookups feeding
//! the shared cache) and the `MovieCatalogService` port (the search and
//! discovery tools exposed to the model).

use async_trait::async_trait;
use movie_tracker_core::domain::{
    DiscoverFilter, GenreItem, KeywordItem, MovieSearchResult, MovieViewModel, PersonSearchResult,
};
use movie_tracker_core::ports::{
    ChatError, ChatResult, MovieCatalogService, MovieMetadataProvider,
};
use serde::Deserialize;
use tracing::debug;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct TmdbAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TmdbAdapter {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: TMDB_BASE_URL.to_string(),
        }
    }

    /// Points the adapter at a different host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ChatResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%path, "tmdb request");
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::Upstream(format!(
                "TMDb returned {} for {}",
                response.status(),
                path
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct TmdbMovieDetails {
    poster_path: Option<String>,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    id: i64,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    title: String,
    backdrop_path: Option<String>,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    vote_count: i64,
    #[serde(default)]
    vote_average: f64,
    imdb_id: Option<String>,
}

#[derive(Deserialize)]
struct TmdbGenre {
    id: i32,
    name: String,
}

#[derive(Deserialize)]
struct TmdbGenreList {
    genres: Vec<TmdbGenre>,
}

#[derive(Deserialize)]
struct TmdbPagedResults<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
struct TmdbMovieSummary {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    release_date: String,
}

#[derive(Deserialize)]
struct TmdbPerson {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct TmdbKeyword {
    id: i64,
    #[serde(default)]
    name: String,
}

impl TmdbMovieDetails {
    fn into_view_model(self) -> MovieViewModel {
        MovieViewModel {
            poster_path: self.poster_path,
            adult: self.adult,
            overview: self.overview,
            release_date: (!self.release_date.is_empty()).then_some(self.release_date),
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
            id: self.id.to_string(),
            original_title: self.original_title,
            original_language: self.original_language,
            title: self.title,
            backdrop_path: self.backdrop_path,
            popularity: self.popularity,
            vote_count: self.vote_count,
            favorite: false,
            vote_average: self.vote_average,
            imdb_id: self.imdb_id.unwrap_or_default(),
        }
    }
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

//=========================================================================================
// `MovieMetadataProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl MovieMetadataProvider for TmdbAdapter {
    async fn movie_details(&self, movie_id: i32) -> ChatResult<MovieViewModel> {
        let details: TmdbMovieDetails = self
            .get_json(&format!("/movie/{}", movie_id), &[])
            .await?;
        Ok(details.into_view_model())
    }
}

//=========================================================================================
// `MovieCatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MovieCatalogService for TmdbAdapter {
    async fn search_movies(
        &self,
        title: &str,
        release_year: Option<i32>,
    ) -> ChatResult<Vec<MovieSearchResult>> {
        let mut query = vec![("query", title.to_string())];
        if let Some(year) = release_year {
            query.push(("year", year.to_string()));
        }
        let page: TmdbPagedResults<TmdbMovieSummary> =
            self.get_json("/search/movie", &query).await?;
        Ok(page
            .results
            .into_iter()
            .map(|m| MovieSearchResult {
                movie_id: m.id.to_string(),
                movie_name: m.title,
                release_date: m.release_date,
            })
            .collect())
    }

    async fn genres_list(&self) -> ChatResult<Vec<GenreItem>> {
        let list: TmdbGenreList = self.get_json("/genre/movie/list", &[]).await?;
        Ok(list
            .genres
            .into_iter()
            .map(|g| GenreItem {
                genre_id: g.id.to_string(),
                genre_name: g.name,
            })
            .collect())
    }

    async fn search_people(&self, name: &str) -> ChatResult<Vec<PersonSearchResult>> {
        let page: TmdbPagedResults<TmdbPerson> = self
            .get_json("/search/person", &[("query", name.to_string())])
            .await?;
        Ok(page
            .results
            .into_iter()
            .map(|p| PersonSearchResult {
                person_id: p.id.to_string(),
                person_name: p.name,
            })
            .collect())
    }

    async fn search_keywords(&self, query: &str) -> ChatResult<Vec<KeywordItem>> {
        let page: TmdbPagedResults<TmdbKeyword> = self
            .get_json("/search/keyword", &[("query", query.to_string())])
            .await?;
        Ok(page
            .results
            .into_iter()
            .map(|k| KeywordItem {
                keyword_id: k.id.to_string(),
                name: k.name,
            })
            .collect())
    }

    async fn discover_movies(&self, filter: DiscoverFilter) -> ChatResult<Vec<MovieSearchResult>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(from) = filter.release_date_from {
            query.push(("primary_release_date.gte", from));
        }
        if let Some(to) = filter.release_date_to {
            query.push(("primary_release_date.lte", to));
        }
        if let Some(cast) = filter.cast_ids.filter(|ids| !ids.is_empty()) {
            query.push(("with_cast", join_ids(&cast)));
        }
        if let Some(genres) = filter.genre_ids.filter(|ids| !ids.is_empty()) {
            query.push(("with_genres", join_ids(&genres)));
        }
        if let Some(keywords) = filter.keyword_ids.filter(|ids| !ids.is_empty()) {
            query.push(("with_keywords", join_ids(&keywords)));
        }
        if let Some(min) = filter.min_vote_average {
            query.push(("vote_average.gte", min.to_string()));
        }
        if let Some(max) = filter.max_vote_average {
            query.push(("vote_average.lte", max.to_string()));
        }
        if let Some(min) = filter.min_vote_count {
            query.push(("vote_count.gte", min.to_string()));
        }
        if let Some(max) = filter.max_vote_count {
            query.push(("vote_count.lte", max.to_string()));
        }

        let page: TmdbPagedResults<TmdbMovieSummary> =
            self.get_json("/discover/movie", &query).await?;
        Ok(page
            .results
            .into_iter()
            .map(|m| MovieSearchResult {
                movie_id: m.id.to_string(),
                movie_name: m.title,
                release_date: m.release_date,
            })
            .collect())
    }
}
