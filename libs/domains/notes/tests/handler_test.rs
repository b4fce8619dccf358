//! Handler tests for the notes domain
//!
//! Exercise the router end to end over the in-memory repository:
//! - bearer-token authentication before body validation
//! - ownership checks (403) and missing notes (404)
//! - response envelopes and status codes
//! - row/index consistency when the index fails

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{ACCESS_TOKEN_TTL, JwtAuth, JwtConfig};
use domain_notes::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

const SECRET: &str = "handler-test-secret-with-32-chars!!";

/// Index double recording which note ids currently have a point
#[derive(Default)]
struct RecordingIndex {
    points: Mutex<HashSet<Uuid>>,
    fail: bool,
}

impl RecordingIndex {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn contains(&self, id: Uuid) -> bool {
        self.points.lock().unwrap().contains(&id)
    }
}

#[async_trait]
impl NoteIndex for RecordingIndex {
    async fn index(&self, note: &Note) -> NoteResult<()> {
        if self.fail {
            return Err(NoteError::Internal("index unavailable".to_string()));
        }
        self.points.lock().unwrap().insert(note.id);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> NoteResult<()> {
        if self.fail {
            return Err(NoteError::Internal("index unavailable".to_string()));
        }
        self.points.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn search(
        &self,
        _user_id: &str,
        _query: &str,
        limit: u64,
    ) -> NoteResult<Vec<(Uuid, f32)>> {
        let points = self.points.lock().unwrap();
        Ok(points
            .iter()
            .take(limit as usize)
            .map(|id| (*id, 0.5))
            .collect())
    }
}

struct TestApp {
    router: Router,
    auth: JwtAuth,
    repo: InMemoryNoteRepository,
}

impl TestApp {
    fn new(index: Option<Arc<RecordingIndex>>) -> Self {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let repo = InMemoryNoteRepository::new();

        let mut service = NoteService::new(repo.clone());
        if let Some(index) = index {
            service = service.with_index(index);
        }

        Self {
            router: handlers::router(service, auth.clone()),
            auth,
            repo,
        }
    }

    fn token(&self, user_id: &str) -> String {
        self.auth.issue_token(user_id, ACCESS_TOKEN_TTL).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            let bearer = format!("Bearer {}", self.token(user_id));
            builder = builder.header("authorization", bearer);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, user_id: &str, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(user_id), None).await
    }

    async fn create(&self, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", "/", Some(user_id), Some(body)).await
    }

    async fn update(&self, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", "/", Some(user_id), Some(body)).await
    }

    async fn delete(&self, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.send("DELETE", "/", Some(user_id), Some(body)).await
    }
}

#[tokio::test]
async fn test_groceries_scenario() {
    let index = Arc::new(RecordingIndex::default());
    let app = TestApp::new(Some(index.clone()));

    let input = json!({ "title": "Groceries", "content": "milk, eggs" });
    let (status, body) = app.create("user_u", input).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["note"]["userId"], "user_u");
    assert_eq!(body["note"]["title"], "Groceries");
    let id: Uuid = body["note"]["id"].as_str().unwrap().parse().unwrap();
    assert!(index.contains(id));

    let input = json!({ "id": id, "title": "Groceries v2" });
    let (status, body) = app.update("user_v", input).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, body) = app.delete("user_u", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert!(!index.contains(id));

    let (status, body) = app.delete("user_u", json!({ "id": id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Note not found");
}

#[tokio::test]
async fn test_update_returns_updated_note_and_keeps_identity() {
    let app = TestApp::new(None);

    let input = json!({ "title": "Groceries", "content": "milk, eggs" });
    let (_, body) = app.create("user_u", input).await;
    let id = body["note"]["id"].clone();

    let input = json!({ "id": id, "title": "Groceries v2" });
    let (status, body) = app.update("user_u", input).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedNote"]["id"], id);
    assert_eq!(body["updatedNote"]["userId"], "user_u");
    assert_eq!(body["updatedNote"]["title"], "Groceries v2");
    assert_eq!(body["updatedNote"]["content"], "milk, eggs");

    let uri = format!("/{}", id.as_str().unwrap());
    let (status, body) = app.get("user_u", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Groceries v2");
}

#[tokio::test]
async fn test_missing_token_is_401_even_with_malformed_body() {
    let app = TestApp::new(None);

    let (status, body) = app.send("POST", "/", None, Some(json!({ "title": 42 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.send("PUT", "/", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("DELETE", "/", None, Some(json!({ "id": 5 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_401() {
    let app = TestApp::new(None);
    let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-32-chars-long"));
    let token = other.issue_token("user_u", ACCESS_TOKEN_TTL).unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_bodies_are_400_and_create_nothing() {
    let app = TestApp::new(None);

    for body in [
        json!({ "title": "" }),
        json!({ "content": "no title" }),
        json!({ "title": 7 }),
    ] {
        let (status, _) = app.create("user_u", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = app.delete("user_u", json!({ "id": "not-a-uuid" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.repo.list_by_owner("user_u").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_note_is_404() {
    let app = TestApp::new(None);
    let id = Uuid::now_v7();

    let (status, _) = app.update("user_u", json!({ "id": id, "title": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("user_u", &format!("/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_foreign_note_is_403() {
    let app = TestApp::new(None);

    let (_, body) = app.create("user_u", json!({ "title": "Diary" })).await;
    let uri = format!("/{}", body["note"]["id"].as_str().unwrap());

    let (status, body) = app.get("user_v", &uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(body["message"], "Forbidden");
    assert!(body.get("title").is_none());
}

#[tokio::test]
async fn test_list_only_returns_callers_notes() {
    let app = TestApp::new(None);

    app.create("user_u", json!({ "title": "mine" })).await;
    app.create("user_v", json!({ "title": "theirs" })).await;

    let (status, body) = app.get("user_u", "/").await;
    assert_eq!(status, StatusCode::OK);
    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "mine");
}

#[tokio::test]
async fn test_index_failure_on_create_is_500_and_leaves_no_row() {
    let app = TestApp::new(Some(Arc::new(RecordingIndex::failing())));

    let (status, body) = app.create("user_u", json!({ "title": "Groceries" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert!(app.repo.list_by_owner("user_u").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_503_when_disabled() {
    let app = TestApp::new(None);

    let (status, _) = app.get("user_u", "/search?query=milk").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_search_returns_hydrated_notes() {
    let app = TestApp::new(Some(Arc::new(RecordingIndex::default())));

    app.create("user_u", json!({ "title": "Groceries" })).await;

    let (status, body) = app.get("user_u", "/search?query=milk&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["note"]["title"], "Groceries");

    let (status, _) = app.get("user_u", "/search?query=milk&limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
