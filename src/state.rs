use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::services::RatingService;
use crate::store::{MemoryStore, MovieStore, PgStore, RatingStore, UserStore, WatchlistStore};

/// Shared application state: injected store handles, the rating service that
/// owns aggregate consistency, and the JWT keys.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieStore>,
    pub ratings: Arc<dyn RatingStore>,
    pub users: Arc<dyn UserStore>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub rating_service: Arc<RatingService>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(
        movies: Arc<dyn MovieStore>,
        ratings: Arc<dyn RatingStore>,
        users: Arc<dyn UserStore>,
        watchlist: Arc<dyn WatchlistStore>,
        jwt: JwtKeys,
    ) -> Self {
        let rating_service = Arc::new(RatingService::new(movies.clone(), ratings.clone()));
        Self {
            movies,
            ratings,
            users,
            watchlist,
            rating_service,
            jwt,
        }
    }

    /// State backed by the in-memory store
    pub fn in_memory(jwt: JwtKeys) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store.clone(), store, jwt)
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, jwt: JwtKeys) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store.clone(), store, jwt)
    }
}
