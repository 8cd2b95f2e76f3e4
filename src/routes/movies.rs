use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{Movie, NewMovie};
use crate::state::AppState;

/// Movie detail payload: the catalogue entry plus the caller's own rating
/// when authenticated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: Movie,
    pub user_rating: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub message: String,
    pub rating: i32,
}

/// Create a new catalogue entry; aggregate fields start at zero
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    if new.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    let movie = state.movies.create(new).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Get all movies, newest first
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.movies.list().await?;
    Ok(Json(movies))
}

/// Get a single movie, with the caller's rating when authenticated
pub async fn get(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovieDetailResponse>> {
    let movie = state
        .movies
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

    let user_rating = match caller {
        Some(AuthUser(user_id)) => state.ratings.find(user_id, id).await?.map(|r| r.value),
        None => None,
    };

    Ok(Json(MovieDetailResponse { movie, user_rating }))
}

/// Rate a movie; delegates to the rating service, which upserts the caller's
/// rating and recomputes the movie's aggregate as one serialized unit
pub async fn rate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RateResponse>> {
    let outcome = state.rating_service.rate(user_id, id, request.rating).await?;

    let message = if outcome.created {
        "Rating added"
    } else {
        "Rating updated"
    };

    Ok(Json(RateResponse {
        message: message.to_string(),
        rating: outcome.value,
    }))
}
