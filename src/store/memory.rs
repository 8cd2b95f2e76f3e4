use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, NewMovie, Rating, User};

use super::{MovieStore, RatingStore, UserStore, WatchlistStore};

/// In-memory backend implementing every store trait.
///
/// Used when no `DATABASE_URL` is configured, and by the test suite. All
/// tables live behind one `RwLock`, so each upsert runs under the write lock
/// and is atomic per (user, movie) key.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    movies: HashMap<Uuid, Movie>,
    ratings: HashMap<(Uuid, Uuid), Rating>,
    watchlists: HashMap<Uuid, Vec<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn create(&self, new: NewMovie) -> AppResult<Movie> {
        let movie = Movie::new(new);
        let mut tables = self.inner.write().await;
        tables.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn list(&self) -> AppResult<Vec<Movie>> {
        let tables = self.inner.read().await;
        let mut movies: Vec<Movie> = tables.movies.values().cloned().collect();
        movies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(movies)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let tables = self.inner.read().await;
        Ok(tables.movies.get(&id).cloned())
    }

    async fn write_aggregate(
        &self,
        id: Uuid,
        average_rating: f64,
        ratings_count: i32,
    ) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        let movie = tables
            .movies
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        movie.average_rating = average_rating;
        movie.ratings_count = ratings_count;
        Ok(())
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        value: i32,
    ) -> AppResult<(Rating, bool)> {
        let mut tables = self.inner.write().await;
        match tables.ratings.get_mut(&(user_id, movie_id)) {
            Some(existing) => {
                existing.value = value;
                existing.updated_at = Utc::now();
                Ok((existing.clone(), false))
            }
            None => {
                let rating = Rating::new(user_id, movie_id, value);
                tables.ratings.insert((user_id, movie_id), rating.clone());
                Ok((rating, true))
            }
        }
    }

    async fn list_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let tables = self.inner.read().await;
        let mut ratings: Vec<Rating> = tables
            .ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.id);
        Ok(ratings)
    }

    async fn find(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let tables = self.inner.read().await;
        Ok(tables.ratings.get(&(user_id, movie_id)).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut tables = self.inner.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        let user = User::new(username.to_string(), password_hash.to_string());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn add(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.write().await;
        let list = tables.watchlists.entry(user_id).or_default();
        if list.contains(&movie_id) {
            return Ok(false);
        }
        list.push(movie_id);
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        if let Some(list) = tables.watchlists.get_mut(&user_id) {
            list.retain(|id| *id != movie_id);
        }
        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Movie>> {
        let tables = self.inner.read().await;
        let ids = tables.watchlists.get(&user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tables.movies.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            description: None,
            poster: None,
            url: None,
            year: None,
            genre: vec![],
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates_in_place() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let movie = Uuid::new_v4();

        let (first, created) = store.upsert(user, movie, 3).await.unwrap();
        assert!(created);
        assert_eq!(first.value, 3);

        let (second, created) = store.upsert(user, movie, 5).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.value, 5);

        let all = store.list_by_movie(movie).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_on_same_key_never_duplicate() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let movie = Uuid::new_v4();

        let mut handles = Vec::new();
        for value in 1..=5 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert(user, movie, value).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = store.list_by_movie(movie).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_write_aggregate_requires_existing_movie() {
        let store = MemoryStore::new();
        let err = store
            .write_aggregate(Uuid::new_v4(), 4.0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_movies_listed_newest_first() {
        let store = MemoryStore::new();
        let first = MovieStore::create(&store, new_movie("First")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = MovieStore::create(&store, new_movie("Second")).await.unwrap();

        let listed = MovieStore::list(&store).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        UserStore::create(&store, "alice", "hash-a").await.unwrap();
        let err = UserStore::create(&store, "alice", "hash-b").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_watchlist_add_is_idempotent() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let movie = MovieStore::create(&store, new_movie("Heat")).await.unwrap();

        assert!(store.add(user, movie.id).await.unwrap());
        assert!(!store.add(user, movie.id).await.unwrap());
        assert_eq!(WatchlistStore::list(&store, user).await.unwrap().len(), 1);

        store.remove(user, movie.id).await.unwrap();
        assert!(WatchlistStore::list(&store, user).await.unwrap().is_empty());
        // Removing an absent entry succeeds
        store.remove(user, movie.id).await.unwrap();
    }
}
