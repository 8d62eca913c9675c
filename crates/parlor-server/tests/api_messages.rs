use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use parlor_auth::{issue_session_token, register_user, User};
use parlor_db::{init_schema, DbSettings, RequestContext, SCHEMA};
use parlor_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret";

fn setup_app() -> (axum::Router, tempfile::TempDir, DbSettings) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let settings = DbSettings::new(dir.path().join("parlor.db").to_string_lossy());

    let mut ctx = RequestContext::new();
    let conn = ctx.get_connection(&settings).expect("failed to open store");
    init_schema(conn, SCHEMA).expect("failed to apply schema");
    ctx.close_connection();

    let state = AppState {
        db: settings.clone(),
        secret: TEST_SECRET.to_string(),
    };
    (app(state), dir, settings)
}

/// Seeds an account directly in the store and returns it with a session
/// token.
fn seed_user(settings: &DbSettings, username: &str) -> (User, String) {
    let mut ctx = RequestContext::new();
    let conn = ctx.get_connection(settings).expect("failed to open store");
    let user = register_user(conn, username, "hunter2").expect("failed to seed user");
    ctx.close_connection();

    let token = issue_session_token(TEST_SECRET, user.id);
    (user, token)
}

fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn create_then_list_messages() {
    let (app, _dir, settings) = setup_app();
    let (_user, token) = seed_user(&settings, "casey");

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/messages",
            &token,
            json!({ "title": "Hello", "body": "First post." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["author"], "casey");

    // The index lists the message without authentication.
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = read_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Hello");
    assert_eq!(listed[0]["author"], "casey");
}

#[tokio::test]
async fn create_requires_authentication() {
    let (app, _dir, _settings) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "title": "Hello", "body": "x" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let (app, _dir, settings) = setup_app();
    let (_user, token) = seed_user(&settings, "casey");

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/messages",
            &token,
            json!({ "title": "   ", "body": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_message_is_not_found() {
    let (app, _dir, _settings) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messages/99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let (app, _dir, settings) = setup_app();
    let (_author, author_token) = seed_user(&settings, "casey");
    let (_other, other_token) = seed_user(&settings, "riley");

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/messages",
            &author_token,
            json!({ "title": "Mine", "body": "original" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let id = created["id"].as_i64().unwrap();

    // Another account may neither edit nor delete.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/messages/{id}"),
            &other_token,
            json!({ "title": "Stolen", "body": "changed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "DELETE",
            &format!("/api/messages/{id}"),
            &other_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author may do both.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/messages/{id}"),
            &author_token,
            json!({ "title": "Mine, edited", "body": "changed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["title"], "Mine, edited");

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "DELETE",
            &format!("/api/messages/{id}"),
            &author_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/messages/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_newest_first() {
    let (app, _dir, settings) = setup_app();
    let (_user, token) = seed_user(&settings, "casey");

    for title in ["one", "two", "three"] {
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/api/messages",
                &token,
                json!({ "title": title, "body": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = read_json(response).await;
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}
