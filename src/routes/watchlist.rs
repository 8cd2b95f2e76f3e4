use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::Movie;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRequest {
    pub movie_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub message: String,
}

/// Get the caller's watchlisted movies
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.watchlist.list(user_id).await?;
    Ok(Json(movies))
}

/// Add a movie to the caller's watchlist; adding an already-listed movie is
/// a no-op with a distinct message
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<WatchlistRequest>,
) -> AppResult<Json<WatchlistResponse>> {
    if state.movies.get(request.movie_id).await?.is_none() {
        return Err(AppError::NotFound("Movie not found".to_string()));
    }

    let added = state.watchlist.add(user_id, request.movie_id).await?;
    let message = if added {
        "Movie added to watchlist"
    } else {
        "Movie already in watchlist"
    };

    Ok(Json(WatchlistResponse {
        message: message.to_string(),
    }))
}

/// Remove a movie from the caller's watchlist; removing an absent entry
/// succeeds
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<WatchlistRequest>,
) -> AppResult<Json<WatchlistResponse>> {
    state.watchlist.remove(user_id, request.movie_id).await?;
    Ok(Json(WatchlistResponse {
        message: "Movie removed from watchlist".to_string(),
    }))
}
