use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalogue entry.
///
/// `average_rating` and `ratings_count` are derived from the Rating records
/// for this movie and are only ever written by the rating service's
/// recomputation; no other path mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub poster: Option<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
    pub genre: Vec<String>,
    /// Rounded mean of all ratings, one decimal; 0.0 while unrated
    pub average_rating: f64,
    pub ratings_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a movie
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl Movie {
    /// Creates a new movie with zeroed aggregate fields
    pub fn new(new: NewMovie) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            poster: new.poster,
            url: new.url,
            year: new.year,
            genre: new.genre,
            average_rating: 0.0,
            ratings_count: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_movie_starts_unrated() {
        let movie = Movie::new(NewMovie {
            title: "The Matrix".to_string(),
            description: None,
            poster: None,
            url: None,
            year: Some(1999),
            genre: vec!["sci-fi".to_string()],
        });
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.average_rating, 0.0);
        assert_eq!(movie.ratings_count, 0);
    }

    #[test]
    fn test_movie_serializes_camel_case() {
        let movie = Movie::new(NewMovie {
            title: "Heat".to_string(),
            description: None,
            poster: None,
            url: None,
            year: Some(1995),
            genre: vec![],
        });
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["averageRating"], 0.0);
        assert_eq!(json["ratingsCount"], 0);
    }
}
