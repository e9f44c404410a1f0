//! crates/movie_tracker_core/src/agents/ratings.rs
//!
//! The ratings agent: single lookup, multi-id comparison, and threshold
//! filtering over the external ratings provider. Failures are normalized
//! into unsuccessful `RatingResult`s — nothing here returns an error to the
//! caller.

use crate::domain::{RatingComparison, RatingResult};
use crate::ports::RatingLookup;
use std::sync::Arc;

#[derive(Clone)]
pub struct RatingsAgent {
    lookup: Arc<dyn RatingLookup>,
}

impl RatingsAgent {
    pub fn new(lookup: Arc<dyn RatingLookup>) -> Self {
        Self { lookup }
    }

    /// Fetches the normalized rating bundle for one external rating id.
    pub async fn movie_ratings(&self, imdb_id: &str) -> RatingResult {
        self.lookup.ratings_by_id(imdb_id).await
    }

    /// Compares several movies and reports the one with the numerically
    /// highest parseable primary rating. Ties are broken by first-seen
    /// order; if no entry has a parseable rating the comparison fails.
    pub async fn compare(&self, imdb_ids: &[String]) -> RatingComparison {
        let mut all_movies = Vec::new();
        for id in imdb_ids {
            let rating = self.lookup.ratings_by_id(id).await;
            if rating.is_success {
                all_movies.push(rating);
            }
        }

        if all_movies.is_empty() {
            return RatingComparison {
                highest_rated_title: String::new(),
                highest_rating: String::new(),
                all_movies,
                is_success: false,
                error_message: "No valid movies found for comparison".to_string(),
            };
        }

        let mut highest: Option<(&RatingResult, f64)> = None;
        for movie in &all_movies {
            if let Ok(value) = movie.imdb_rating.parse::<f64>() {
                // Strict comparison keeps the first-seen entry on ties.
                if highest.map_or(true, |(_, best)| value > best) {
                    highest = Some((movie, value));
                }
            }
        }

        match highest {
            Some((movie, _)) => RatingComparison {
                highest_rated_title: format!("{} ({})", movie.title, movie.year),
                highest_rating: movie.imdb_rating.clone(),
                all_movies: all_movies.clone(),
                is_success: true,
                error_message: String::new(),
            },
            None => RatingComparison {
                highest_rated_title: String::new(),
                highest_rating: String::new(),
                all_movies,
                is_success: false,
                error_message: "No movies with valid IMDb ratings found".to_string(),
            },
        }
    }

    /// Returns the subsequence of inputs whose primary rating parses and is
    /// at least `minimum_rating`, preserving input order. Ids that fail
    /// outright are skipped rather than aborting the batch.
    pub async fn filter_by_rating(
        &self,
        imdb_ids: &[String],
        minimum_rating: f64,
    ) -> Vec<RatingResult> {
        let mut qualifying = Vec::new();
        for id in imdb_ids {
            let rating = self.lookup.ratings_by_id(id).await;
            if !rating.is_success {
                continue;
            }
            if let Ok(value) = rating.imdb_rating.parse::<f64>() {
                if value >= minimum_rating {
                    qualifying.push(rating);
                }
            }
        }
        qualifying
    }
}
