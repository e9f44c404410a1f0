//! services/api/src/adapters/omdb.rs
//!
//! Ratings adapter backed by the Open Movie Database HTTP API. Implements the
//! `RatingLookup` port; every failure (transport, unknown id, upstream error)
//! is folded into an unsuccessful `RatingResult` rather than an error value.

use async_trait::async_trait;
use movie_tracker_core::domain::RatingResult;
use movie_tracker_core::ports::RatingLookup;
use serde::Deserialize;
use tracing::{debug, warn};

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

const NOT_AVAILABLE: &str = "N/A";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct OmdbAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbAdapter {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: OMDB_BASE_URL.to_string(),
        }
    }

    /// Points the adapter at a different host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, imdb_id: &str) -> Result<OmdbResponse, String> {
        debug!(imdb_id, "omdb request");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("i", imdb_id)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("OMDb returned {}", response.status()));
        }

        response.json::<OmdbResponse>().await.map_err(|e| e.to_string())
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbRating", default = "not_available")]
    imdb_rating: String,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRatingEntry>,
    #[serde(rename = "BoxOffice", default = "not_available")]
    box_office: String,
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error", default)]
    error: String,
}

#[derive(Deserialize)]
struct OmdbRatingEntry {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl OmdbResponse {
    fn rating_by_source(&self, source: &str) -> String {
        self.ratings
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.value.clone())
            .unwrap_or_else(not_available)
    }

    fn into_result(self) -> RatingResult {
        let rotten_tomatoes_rating = self.rating_by_source("Rotten Tomatoes");
        let metacritic_rating = self.rating_by_source("Metacritic");
        RatingResult {
            title: self.title,
            year: self.year,
            imdb_rating: self.imdb_rating,
            rotten_tomatoes_rating,
            metacritic_rating,
            box_office: self.box_office,
            is_success: true,
            error_message: String::new(),
        }
    }
}

//=========================================================================================
// `RatingLookup` Trait Implementation
//=========================================================================================

#[async_trait]
impl RatingLookup for OmdbAdapter {
    async fn ratings_by_id(&self, imdb_id: &str) -> RatingResult {
        match self.fetch(imdb_id).await {
            Ok(response) if response.response.eq_ignore_ascii_case("True") => {
                response.into_result()
            }
            Ok(response) => {
                debug!(imdb_id, error = %response.error, "omdb lookup missed");
                RatingResult::failure(format!("Movie not found for IMDb ID: {imdb_id}"))
            }
            Err(message) => {
                warn!(imdb_id, error = %message, "omdb lookup failed");
                RatingResult::failure(format!("Error retrieving ratings: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_sources_are_extracted_from_the_ratings_array() {
        let response: OmdbResponse = serde_json::from_str(
            r#"{
                "Title": "Inception",
                "Year": "2010",
                "imdbRating": "8.8",
                "Ratings": [
                    { "Source": "Internet Movie Database", "Value": "8.8/10" },
                    { "Source": "Rotten Tomatoes", "Value": "87%" },
                    { "Source": "Metacritic", "Value": "74/100" }
                ],
                "BoxOffice": "$292,576,195",
                "Response": "True"
            }"#,
        )
        .unwrap();

        let result = response.into_result();
        assert!(result.is_success);
        assert_eq!(result.imdb_rating, "8.8");
        assert_eq!(result.rotten_tomatoes_rating, "87%");
        assert_eq!(result.metacritic_rating, "74/100");
        assert_eq!(result.box_office, "$292,576,195");
    }

    #[test]
    fn missing_sources_fall_back_to_not_available() {
        let response: OmdbResponse = serde_json::from_str(
            r#"{
                "Title": "Obscure Film",
                "Year": "1999",
                "imdbRating": "6.1",
                "Ratings": [],
                "Response": "True"
            }"#,
        )
        .unwrap();

        let result = response.into_result();
        assert_eq!(result.rotten_tomatoes_rating, "N/A");
        assert_eq!(result.metacritic_rating, "N/A");
        assert_eq!(result.box_office, "N/A");
    }
}
