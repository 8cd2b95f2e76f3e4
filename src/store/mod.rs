pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Movie, NewMovie, Rating, User};

/// Durable storage of catalogue entries and their derived aggregate fields
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create(&self, new: NewMovie) -> AppResult<Movie>;

    /// All movies, newest first
    async fn list(&self) -> AppResult<Vec<Movie>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Movie>>;

    /// Unconditional overwrite of `average_rating` and `ratings_count`.
    /// Fails with `NotFound` if the movie no longer exists.
    async fn write_aggregate(
        &self,
        id: Uuid,
        average_rating: f64,
        ratings_count: i32,
    ) -> AppResult<()>;
}

/// Durable storage of individual rating records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Create-or-update keyed by (user, movie), atomic with respect to
    /// concurrent upserts on the same key. The boolean is true when a new
    /// record was created rather than an existing one updated.
    async fn upsert(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        value: i32,
    ) -> AppResult<(Rating, bool)>;

    /// All ratings for a movie, in a stable order
    async fn list_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>>;

    async fn find(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>>;
}

/// Account storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

/// Per-user watchlist membership
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Returns false when the movie was already on the list
    async fn add(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool>;

    async fn remove(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<()>;

    /// The user's watchlisted movies, in insertion order
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Movie>>;
}
