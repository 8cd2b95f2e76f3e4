use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use marquee_api::auth::JwtKeys;
use marquee_api::{create_router, AppState};

fn create_test_server() -> TestServer {
    let state = AppState::in_memory(JwtKeys::new("test-secret", 3600));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Registers a user and returns their bearer token
async fn register(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": "hunter22"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

/// Creates a movie and returns its id
async fn create_movie(server: &TestServer, title: &str) -> String {
    let response = server
        .post("/api/movies")
        .json(&json!({ "title": title }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_and_login() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice",
            "password": "hunter22"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("passwordHash").is_none());

    // Duplicate username
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice",
            "password": "hunter23"
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Login with the right password
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "alice",
            "password": "hunter22"
        }))
        .await;
    response.assert_status_ok();

    // Wrong password
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "alice",
            "password": "wrong-password"
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validates_input() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "username": "  ", "password": "hunter22" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "username": "bob", "password": "short" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_and_get_movie() {
    let server = create_test_server();

    let response = server
        .post("/api/movies")
        .json(&json!({
            "title": "The Matrix",
            "year": 1999,
            "genre": ["sci-fi", "action"]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "The Matrix");
    assert_eq!(created["averageRating"], 0.0);
    assert_eq!(created["ratingsCount"], 0);

    let response = server.get("/api/movies").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 1);

    let id = created["id"].as_str().unwrap();
    let response = server.get(&format!("/api/movies/{}", id)).await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["title"], "The Matrix");
    // Anonymous callers get no userRating
    assert_eq!(movie["userRating"], Value::Null);
}

#[tokio::test]
async fn test_create_movie_requires_title() {
    let server = create_test_server();
    let response = server.post("/api/movies").json(&json!({ "title": " " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_movie_is_404() {
    let server = create_test_server();
    let response = server
        .get("/api/movies/00000000-0000-0000-0000-000000000000")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_flow_updates_aggregate() {
    let server = create_test_server();
    let movie_id = create_movie(&server, "Blade Runner").await;
    let alice = register(&server, "alice").await;
    let bob = register(&server, "bob").await;

    // Alice rates 4
    let response = server
        .post(&format!("/api/movies/{}/rate", movie_id))
        .authorization_bearer(&alice)
        .json(&json!({ "rating": 4 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Rating added");
    assert_eq!(body["rating"], 4);

    let movie: Value = server.get(&format!("/api/movies/{}", movie_id)).await.json();
    assert_eq!(movie["averageRating"], 4.0);
    assert_eq!(movie["ratingsCount"], 1);

    // Bob rates 5
    server
        .post(&format!("/api/movies/{}/rate", movie_id))
        .authorization_bearer(&bob)
        .json(&json!({ "rating": 5 }))
        .await
        .assert_status_ok();

    let movie: Value = server.get(&format!("/api/movies/{}", movie_id)).await.json();
    assert_eq!(movie["averageRating"], 4.5);
    assert_eq!(movie["ratingsCount"], 2);

    // Alice re-rates 2: count unchanged, her old 4 replaced
    let response = server
        .post(&format!("/api/movies/{}/rate", movie_id))
        .authorization_bearer(&alice)
        .json(&json!({ "rating": 2 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Rating updated");

    let response = server
        .get(&format!("/api/movies/{}", movie_id))
        .authorization_bearer(&alice)
        .await;
    let movie: Value = response.json();
    assert_eq!(movie["averageRating"], 3.5);
    assert_eq!(movie["ratingsCount"], 2);
    // Authenticated detail view carries the caller's own rating
    assert_eq!(movie["userRating"], 2);
}

#[tokio::test]
async fn test_rating_requires_auth_and_valid_value() {
    let server = create_test_server();
    let movie_id = create_movie(&server, "Alien").await;
    let token = register(&server, "carol").await;

    // No token
    let response = server
        .post(&format!("/api/movies/{}/rate", movie_id))
        .json(&json!({ "rating": 3 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    // Out-of-range values
    for bad in [0, 6] {
        let response = server
            .post(&format!("/api/movies/{}/rate", movie_id))
            .authorization_bearer(&token)
            .json(&json!({ "rating": bad }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // Unknown movie
    let response = server
        .post("/api/movies/00000000-0000-0000-0000-000000000000/rate")
        .authorization_bearer(&token)
        .json(&json!({ "rating": 3 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Nothing stuck to the aggregate
    let movie: Value = server.get(&format!("/api/movies/{}", movie_id)).await.json();
    assert_eq!(movie["ratingsCount"], 0);
}

#[tokio::test]
async fn test_watchlist_flow() {
    let server = create_test_server();
    let movie_id = create_movie(&server, "Heat").await;
    let token = register(&server, "dave").await;

    // Watchlist requires auth
    server.get("/api/watchlist").await.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/watchlist/add")
        .authorization_bearer(&token)
        .json(&json!({ "movieId": movie_id }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Movie added to watchlist");

    // Adding again is a no-op
    let response = server
        .post("/api/watchlist/add")
        .authorization_bearer(&token)
        .json(&json!({ "movieId": movie_id }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Movie already in watchlist");

    let response = server.get("/api/watchlist").authorization_bearer(&token).await;
    response.assert_status_ok();
    let listed: Vec<Value> = response.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Heat");

    let response = server
        .post("/api/watchlist/remove")
        .authorization_bearer(&token)
        .json(&json!({ "movieId": movie_id }))
        .await;
    response.assert_status_ok();

    let listed: Vec<Value> = server
        .get("/api/watchlist")
        .authorization_bearer(&token)
        .await
        .json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_watchlist_add_unknown_movie_is_404() {
    let server = create_test_server();
    let token = register(&server, "erin").await;

    let response = server
        .post("/api/watchlist/add")
        .authorization_bearer(&token)
        .json(&json!({ "movieId": "00000000-0000-0000-0000-000000000000" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
