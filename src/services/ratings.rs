use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::rating::{MAX_RATING, MIN_RATING};
use crate::store::{MovieStore, RatingStore};

/// Result of a rate call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateOutcome {
    /// True when a new rating was created rather than an existing one updated
    pub created: bool,
    pub value: i32,
}

/// Owns the consistency contract between the rating records and the derived
/// `(average_rating, ratings_count)` summary on each movie.
///
/// Every successful rate call upserts the caller's rating and then recomputes
/// the summary from the full rating set, so a retry after a partial failure
/// always converges. The upsert-recompute-write sequence for one movie runs
/// under that movie's entry in `recompute_locks`: without it, two concurrent
/// raters of the same movie can interleave their list-and-write sequences and
/// the later write silently drops the earlier rating from the aggregate.
/// Locks are keyed by movie id, so raters of different movies never contend,
/// and no call ever holds more than one lock.
pub struct RatingService {
    movies: Arc<dyn MovieStore>,
    ratings: Arc<dyn RatingStore>,
    recompute_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RatingService {
    pub fn new(movies: Arc<dyn MovieStore>, ratings: Arc<dyn RatingStore>) -> Self {
        Self {
            movies,
            ratings,
            recompute_locks: DashMap::new(),
        }
    }

    /// Records `value` as `user_id`'s rating of `movie_id` and recomputes the
    /// movie's aggregate fields.
    pub async fn rate(&self, user_id: Uuid, movie_id: Uuid, value: i32) -> AppResult<RateOutcome> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        if self.movies.get(movie_id).await?.is_none() {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }

        let lock = self
            .recompute_locks
            .entry(movie_id)
            .or_insert_with(Default::default)
            .clone();
        let _guard = lock.lock().await;

        let (rating, created) = self.ratings.upsert(user_id, movie_id, value).await?;

        let ratings = self.ratings.list_by_movie(movie_id).await?;
        let count = ratings.len() as i32;
        let sum: i64 = ratings.iter().map(|r| i64::from(r.value)).sum();
        let average = round_mean(sum, count);

        self.movies.write_aggregate(movie_id, average, count).await?;

        tracing::debug!(
            %movie_id,
            %user_id,
            value = rating.value,
            created,
            average_rating = average,
            ratings_count = count,
            "Rating recorded"
        );

        Ok(RateOutcome {
            created,
            value: rating.value,
        })
    }
}

/// Mean rounded to one decimal, half away from zero; 0.0 for an empty set
fn round_mean(sum: i64, count: i32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let mean = sum as f64 / f64::from(count);
    (mean * 10.0).round() / 10.0
}
