//! In-process synthesis endpoint for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use tarjeta_core::audio::EncodedAudio;

#[derive(Clone, Copy)]
pub enum Reply {
    /// 200 with this base64 payload as `audioContent`.
    Audio(&'static str),
    /// 200 with the request text, base64-encoded, as `audioContent`.
    EchoText,
    /// Bare status code.
    Status(u16),
    /// 200 with this raw body.
    Body(&'static str),
    /// Hold the request this long, then reply as `Audio`.
    Stall(Duration),
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    bodies: Arc<Mutex<Vec<String>>>,
    keys: Arc<Mutex<Vec<String>>>,
}

pub struct MockServer {
    pub endpoint: String,
    state: MockState,
}

impl MockServer {
    pub fn bodies(&self) -> Vec<String> {
        self.state.bodies.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.keys.lock().unwrap().clone()
    }
}

pub async fn spawn(reply: Reply) -> MockServer {
    let state = MockState {
        reply,
        bodies: Arc::default(),
        keys: Arc::default(),
    };
    let app = Router::new()
        .route("/synthesize", post(synthesize))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        endpoint: format!("http://{addr}/synthesize"),
        state,
    }
}

/// An endpoint nothing is listening on.
pub async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/synthesize")
}

async fn synthesize(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    state
        .keys
        .lock()
        .unwrap()
        .push(params.get("key").cloned().unwrap_or_default());
    state.bodies.lock().unwrap().push(body.clone());

    match state.reply {
        Reply::Audio(payload) => Json(serde_json::json!({ "audioContent": payload })).into_response(),
        Reply::EchoText => {
            let request: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
            let text = request["input"]["text"].as_str().unwrap_or_default();
            let payload = EncodedAudio::from_bytes(text.as_bytes());
            Json(serde_json::json!({ "audioContent": payload.as_str() })).into_response()
        }
        Reply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "mock failure").into_response()
        }
        Reply::Body(raw) => (StatusCode::OK, raw).into_response(),
        Reply::Stall(delay) => {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({ "audioContent": "aG9sYQ==" })).into_response()
        }
    }
}
