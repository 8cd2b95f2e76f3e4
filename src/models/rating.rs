use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted rating value
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating value
pub const MAX_RATING: i32 = 5;

/// One user's rating of one movie.
///
/// At most one Rating exists per (user, movie) pair; re-rating mutates
/// `value` and `updated_at` in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub value: i32,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: Uuid, movie_id: Uuid, value: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            value,
            updated_at: Utc::now(),
        }
    }
}
