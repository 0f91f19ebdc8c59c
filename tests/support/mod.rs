//! A fake student service for integration tests.
//!
//! Routes are served by axum on an ephemeral port and delegate to
//! [`InMemoryBackend`], whose rejections go out in the nested error shape.
//! A few magic inputs trigger the other shapes a real deployment can produce:
//!
//! - creating a student with email [`TAKEN_EMAIL`] returns a flat 409
//! - roll number [`LEGACY_ROLL`] returns a request-validation (array) 422
//! - `GET /api/students/{BAD_GATEWAY_ID}` returns an HTML 502
#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rollbook::error::RollbookError;
use rollbook::model::{StudentDraft, StudentPatch};
use rollbook::store::memory::InMemoryBackend;
use rollbook::store::StudentBackend;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;

pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const LEGACY_ROLL: &str = "LEGACY-1";
pub const BAD_GATEWAY_ID: i64 = 502;

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
}

pub fn router(backend: InMemoryBackend) -> Router {
    Router::new()
        .route("/api/students", get(list).post(create))
        .route(
            "/api/students/{id}",
            get(fetch).put(update).patch(patch).delete(remove),
        )
        .with_state(backend)
}

fn reply<T: Serialize>(result: Result<T, RollbookError>, ok: StatusCode) -> Response {
    match result {
        Ok(value) => (ok, Json(value)).into_response(),
        Err(RollbookError::Api(err)) => {
            let status =
                StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({
                "detail": { "detail": err.message, "code": err.code, "field": err.field }
            });
            (status, Json(body)).into_response()
        }
        Err(other) => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
    }
}

async fn list(
    State(backend): State<InMemoryBackend>,
    Query(params): Query<ListParams>,
) -> Response {
    reply(backend.list(params.search.as_deref()).await, StatusCode::OK)
}

async fn create(
    State(backend): State<InMemoryBackend>,
    Json(draft): Json<StudentDraft>,
) -> Response {
    if draft.email == TAKEN_EMAIL {
        let body = json!({ "detail": "Email already exists", "code": "DUPLICATE_EMAIL" });
        return (StatusCode::CONFLICT, Json(body)).into_response();
    }
    if draft.roll_number == LEGACY_ROLL {
        let body = json!({
            "detail": [{ "loc": ["body", "roll_number"], "msg": "Roll number is reserved" }]
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }
    reply(backend.create(&draft).await, StatusCode::CREATED)
}

async fn fetch(State(backend): State<InMemoryBackend>, Path(id): Path<i64>) -> Response {
    if id == BAD_GATEWAY_ID {
        return (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response();
    }
    reply(backend.get(id).await, StatusCode::OK)
}

async fn update(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<i64>,
    Json(draft): Json<StudentDraft>,
) -> Response {
    reply(backend.update(id, &draft).await, StatusCode::OK)
}

async fn patch(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<i64>,
    Json(patch): Json<StudentPatch>,
) -> Response {
    reply(backend.patch(id, &patch).await, StatusCode::OK)
}

async fn remove(State(backend): State<InMemoryBackend>, Path(id): Path<i64>) -> Response {
    reply(backend.delete(id).await, StatusCode::OK)
}

pub async fn seed(backend: &InMemoryBackend, students: &[(&str, &str, &str)]) {
    for (name, email, roll_number) in students {
        backend
            .create(&StudentDraft::new(*name, *email, *roll_number))
            .await
            .unwrap();
    }
}

/// Serves on the current runtime. Returns the host to hand to `HttpBackend::new`.
pub async fn spawn(backend: InMemoryBackend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(backend)).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serves from a background thread, for tests that drive the binary.
/// Returns the `--api-url` value for the server.
pub fn spawn_in_thread(students: &[(&str, &str, &str)]) -> (String, InMemoryBackend) {
    let backend = InMemoryBackend::new();
    let seeded = backend.clone();
    let students: Vec<(String, String, String)> = students
        .iter()
        .map(|(n, e, r)| (n.to_string(), e.to_string(), r.to_string()))
        .collect();
    let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            for (name, email, roll_number) in &students {
                seeded
                    .create(&StudentDraft::new(name.as_str(), email.as_str(), roll_number.as_str()))
                    .await
                    .unwrap();
            }
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router(seeded)).await.unwrap();
        });
    });

    let addr = rx.recv().unwrap();
    (format!("http://{}/api", addr), backend)
}
