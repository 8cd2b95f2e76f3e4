use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, NewMovie, Rating, User};

use super::{MovieStore, RatingStore, UserStore, WatchlistStore};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL backend implementing every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn create(&self, new: NewMovie) -> AppResult<Movie> {
        let movie = Movie::new(new);
        sqlx::query(
            r#"
            INSERT INTO movies
                (id, title, description, poster, url, year, genre,
                 average_rating, ratings_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.poster)
        .bind(&movie.url)
        .bind(movie.year)
        .bind(&movie.genre)
        .bind(movie.average_rating)
        .bind(movie.ratings_count)
        .bind(movie.created_at)
        .execute(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn list(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT * FROM movies ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn write_aggregate(
        &self,
        id: Uuid,
        average_rating: f64,
        ratings_count: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE movies SET average_rating = $2, ratings_count = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(average_rating)
        .bind(ratings_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        value: i32,
    ) -> AppResult<(Rating, bool)> {
        // The UNIQUE (user_id, movie_id) constraint plus ON CONFLICT makes
        // this a single atomic statement; concurrent first-time raters can
        // never produce two rows for one key. `xmax = 0` distinguishes a
        // fresh insert from a conflict-update.
        let row = sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, movie_id, value, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (user_id, movie_id)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING id, user_id, movie_id, value, updated_at, (xmax = 0) AS created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(movie_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        let rating = Rating {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            movie_id: row.try_get("movie_id")?,
            value: row.try_get("value")?,
            updated_at: row.try_get("updated_at")?,
        };
        let created: bool = row.try_get("created")?;
        Ok((rating, created))
    }

    async fn list_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT id, user_id, movie_id, value, updated_at FROM ratings WHERE movie_id = $1 ORDER BY id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    async fn find(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT id, user_id, movie_id, value, updated_at FROM ratings WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let user = User::new(username.to_string(), password_hash.to_string());
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl WatchlistStore for PgStore {
    async fn add(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO watchlist (user_id, movie_id, added_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT m.* FROM movies m
            JOIN watchlist w ON w.movie_id = m.id
            WHERE w.user_id = $1
            ORDER BY w.added_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }
}
