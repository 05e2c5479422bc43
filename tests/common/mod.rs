#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{ Arc, Mutex };

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{ header, HeaderMap, StatusCode };
use axum::routing::{ post, put };
use axum::{ Json, Router };
use serde_json::{ json, Value };

/// What the fake backend received.
#[derive(Default)]
pub struct Recorded {
    pub chat: Vec<Value>,
    pub upload_url: Vec<Value>,
    pub puts: Vec<(String, Vec<u8>)>,
    pub tts: Vec<Value>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Reply,
    Rejected,
    ServerError,
    MissingReply,
}

#[derive(Clone)]
pub struct Backend {
    pub base_url: String,
    pub recorded: Arc<Mutex<Recorded>>,
}

#[derive(Clone)]
struct AppState {
    base_url: String,
    chat_mode: ChatMode,
    storage_status: StatusCode,
    recorded: Arc<Mutex<Recorded>>,
}

async fn chat_process(State(state): State<AppState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    state.recorded.lock().unwrap().chat.push(body);
    match state.chat_mode {
        ChatMode::Reply => (StatusCode::OK, Json(json!({ "success": true, "llm_response": format!("## Resposta\n- {}", query) }))),
        ChatMode::Rejected => (StatusCode::OK, Json(json!({ "success": false, "error": "model unavailable" }))),
        ChatMode::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))),
        ChatMode::MissingReply => (StatusCode::OK, Json(json!({ "success": true }))),
    }
}

async fn upload_url(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    let file_name = body["fileName"].as_str().unwrap_or_default().to_string();
    let user_id = body["userId"].as_str().unwrap_or_default().to_string();
    state.recorded.lock().unwrap().upload_url.push(body);
    if file_name == "forbidden.pdf" {
        return Json(json!({ "success": false, "error": "not allowed" }));
    }
    Json(json!({
        "success": true,
        "uploadUrl": format!("{}/storage", state.base_url),
        "s3Path": format!("s3://copiloto/{}/{}", user_id, file_name)
    }))
}

async fn storage(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.recorded.lock().unwrap().puts.push((content_type, body.to_vec()));
    state.storage_status
}

async fn text_to_speech(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    state.recorded.lock().unwrap().tts.push(body);
    Json(json!({ "success": true, "audioUrl": "https://cdn.example.com/audio/1.mp3" }))
}

pub async fn spawn_backend(chat_mode: ChatMode, storage_status: StatusCode) -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let recorded = Arc::new(Mutex::new(Recorded::default()));

    let state = AppState {
        base_url: base_url.clone(),
        chat_mode,
        storage_status,
        recorded: recorded.clone(),
    };
    let app = Router::new()
        .route("/chat-process", post(chat_process))
        .route("/upload-url", post(upload_url))
        .route("/storage", put(storage))
        .route("/text-to-speech", post(text_to_speech))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Backend { base_url, recorded }
}

pub fn write_file(dir: &std::path::Path, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![7u8; len]).unwrap();
    path
}
