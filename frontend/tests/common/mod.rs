//! In-process mock of the studio backend for integration tests.

#![allow(dead_code)]

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A request the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub query: Option<String>,
    pub body_len: usize,
}

/// A multipart field the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub size: usize,
    pub text: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub materials: HashMap<String, Vec<Value>>,
    pub next_id: u64,
    pub requests: Vec<Recorded>,
    pub last_form: Vec<ReceivedPart>,
    pub last_json: Option<Value>,
    /// Remaining status answers per task; the last one repeats
    pub task_scripts: HashMap<String, Vec<&'static str>>,
    pub task_kinds: HashMap<String, String>,
}

impl MockState {
    fn record(&mut self, method: &'static str, path: String, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.push(Recorded {
            method,
            path,
            content_type: header("content-type"),
            authorization: header("authorization"),
            query: None,
            body_len: 0,
        });
    }
}

type Shared = Arc<Mutex<MockState>>;

/// Running mock backend.
pub struct MockBackend {
    /// API root, e.g. `http://127.0.0.1:41234/api`
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    /// Add a material directly to the mock's storage.
    pub fn seed(&self, kind: &str, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id.to_string();
        let material = json!({
            "id": state.next_id,
            "name": name,
            "description": format!("{} description", name),
            "main_image": format!("{}.png", name.to_lowercase()),
            "aux_images": [],
        });
        state
            .materials
            .entry(kind.to_string())
            .or_default()
            .push(material);
        id
    }

    /// Store a material exactly as given.
    pub fn seed_raw(&self, kind: &str, material: Value) {
        self.state
            .lock()
            .unwrap()
            .materials
            .entry(kind.to_string())
            .or_default()
            .push(material);
    }

    /// Remove a material behind the client's back.
    pub fn remove(&self, kind: &str, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(items) = state.materials.get_mut(kind) {
            items.retain(|m| id_of(m) != id);
        }
    }

    pub fn count(&self, method: &str, path_prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .count()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_form(&self) -> Vec<ReceivedPart> {
        self.state.lock().unwrap().last_form.clone()
    }

    pub fn last_json(&self) -> Option<Value> {
        self.state.lock().unwrap().last_json.clone()
    }
}

/// Start the mock on an ephemeral port.
pub async fn spawn() -> MockBackend {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));

    let app = Router::new()
        .route(
            "/api/materials/{kind}",
            get(list_materials).post(create_material),
        )
        .route(
            "/api/materials/{kind}/{id}",
            get(get_material)
                .put(update_material)
                .delete(delete_material),
        )
        .route("/api/works", get(list_works).post(create_work))
        .route("/api/tools/{tool}/create", post(create_task))
        .route("/api/tasks/{id}/status", get(task_status))
        .route("/api/tasks/{id}/result", get(task_result))
        .route("/api/tools/history", get(list_history))
        .route("/api/tools/history/{id}", get(history_detail))
        .route("/api/styles", any(record_any))
        .route("/api/styles/{*rest}", any(record_any))
        .route("/api/episodes", any(record_any))
        .route("/api/episodes/{*rest}", any(record_any))
        .route("/api/content/{*rest}", any(record_any))
        .route("/api/errors/{case}", get(error_case))
        .route("/api/empty", post(empty_ok))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

fn id_of(material: &Value) -> String {
    match &material["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": format!("Material {} not found", id) })),
    )
        .into_response()
}

async fn read_form(mut multipart: Multipart) -> Vec<ReceivedPart> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        let text = if file_name.is_none() {
            Some(String::from_utf8_lossy(&data).into_owned())
        } else {
            None
        };
        parts.push(ReceivedPart {
            name,
            file_name,
            size: data.len(),
            text,
        });
    }
    parts
}

fn text_field(parts: &[ReceivedPart], name: &str) -> Option<String> {
    parts
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.text.clone())
}

async fn list_materials(
    State(state): State<Shared>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.record("GET", format!("/materials/{}", kind), &headers);
    let items = state.materials.get(&kind).cloned().unwrap_or_default();
    Json(json!({ "materials": items }))
}

async fn get_material(
    State(state): State<Shared>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record("GET", format!("/materials/{}/{}", kind, id), &headers);
    let found = state
        .materials
        .get(&kind)
        .and_then(|items| items.iter().find(|m| id_of(m) == id).cloned());
    match found {
        Some(material) => Json(json!({ "material": material })).into_response(),
        None => not_found(&id),
    }
}

async fn create_material(
    State(state): State<Shared>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let parts = read_form(multipart).await;
    let mut state = state.lock().unwrap();
    state.record("POST", format!("/materials/{}", kind), &headers);

    let Some(name) = text_field(&parts, "name") else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "name"], "msg": "field required" }] })),
        )
            .into_response();
    };
    state.next_id += 1;
    let main_image = parts
        .iter()
        .find(|p| p.name == "main_image")
        .and_then(|p| p.file_name.clone());
    let material = json!({
        "id": state.next_id,
        "name": name,
        "description": text_field(&parts, "description"),
        "main_image": main_image,
        "aux_images": [],
    });
    state
        .materials
        .entry(kind)
        .or_default()
        .push(material.clone());
    state.last_form = parts;
    Json(json!({ "success": true, "material": material })).into_response()
}

async fn update_material(
    State(state): State<Shared>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let parts = read_form(multipart).await;
    let mut state = state.lock().unwrap();
    state.record("PUT", format!("/materials/{}/{}", kind, id), &headers);

    let name = text_field(&parts, "name");
    let description = text_field(&parts, "description");
    let updated = state
        .materials
        .get_mut(&kind)
        .and_then(|items| items.iter_mut().find(|m| id_of(m) == id))
        .map(|material| {
            if let Some(name) = name {
                material["name"] = json!(name);
            }
            if let Some(description) = description {
                material["description"] = json!(description);
            }
            material.clone()
        });
    state.last_form = parts;
    match updated {
        Some(material) => Json(json!({ "success": true, "material": material })).into_response(),
        None => not_found(&id),
    }
}

async fn delete_material(
    State(state): State<Shared>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record("DELETE", format!("/materials/{}/{}", kind, id), &headers);
    let Some(items) = state.materials.get_mut(&kind) else {
        return not_found(&id);
    };
    let before = items.len();
    items.retain(|m| id_of(m) != id);
    if items.len() == before {
        return not_found(&id);
    }
    Json(json!({ "success": true })).into_response()
}

async fn list_works(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    state
        .lock()
        .unwrap()
        .record("GET", "/works".to_string(), &headers);
    Json(json!([{ "id": "w1", "name": "Moon Saga", "style_id": 2 }]))
}

async fn create_work(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.record("POST", "/works".to_string(), &headers);
    state.last_json = Some(body.clone());
    Json(json!({ "work": { "id": "w2", "name": body["name"] } }))
}

async fn create_task(
    State(state): State<Shared>,
    Path(tool): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Json<Value> {
    let parts = read_form(multipart).await;
    let mut state = state.lock().unwrap();
    state.record("POST", format!("/tools/{}/create", tool), &headers);
    state.next_id += 1;
    let id = format!("task-{}", state.next_id);
    let script = match tool.as_str() {
        "broken" => vec!["running", "failed"],
        "slow" => vec!["running"],
        _ => vec!["queued", "processing", "completed"],
    };
    state.task_scripts.insert(id.clone(), script);
    state.task_kinds.insert(id.clone(), tool);
    state.last_form = parts;
    Json(json!({ "task_id": id, "status": "pending" }))
}

async fn task_status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record("GET", format!("/tasks/{}/status", id), &headers);
    let Some(script) = state.task_scripts.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Task {} not found", id) })),
        )
            .into_response();
    };
    let status = if script.len() > 1 {
        script.remove(0)
    } else {
        script[0]
    };
    let mut body = json!({ "task_id": id, "status": status });
    if status == "failed" {
        body["error"] = json!("GPU out of memory");
    }
    Json(body).into_response()
}

async fn task_result(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.record("GET", format!("/tasks/{}/result", id), &headers);
    Json(json!({ "task_id": id, "images": ["outputs/frame_001.png"] }))
}

async fn list_history(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    state
        .lock()
        .unwrap()
        .record("GET", "/tools/history".to_string(), &headers);
    Json(json!([
        { "id": 1, "tool_type": "image", "status": "completed", "created_at": "2026-01-02T10:00:00" },
        { "id": 2, "tool_type": "video", "status": "error" },
        { "id": 3, "tool_type": "audio", "status": "cancelled" }
    ]))
}

async fn history_detail(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    state
        .lock()
        .unwrap()
        .record("GET", format!("/tools/history/{}", id), &headers);
    Json(json!({ "record": { "id": id, "tool_type": "image", "params": { "prompt": "a cat" } } }))
}

async fn error_case(Path(case): Path<String>) -> Response {
    match case.as_str() {
        "detail" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Bad prompt", "message": "ignored" })),
        )
            .into_response(),
        "message" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "message": "Slow down" })),
        )
            .into_response(),
        "json" => (StatusCode::CONFLICT, Json(json!({ "code": 7 }))).into_response(),
        _ => (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response(),
    }
}

async fn empty_ok() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn method_name(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        _ => "OTHER",
    }
}

/// Record any style, episode or content request and answer with canned data.
async fn record_any(State(state): State<Shared>, request: Request) -> Response {
    let method = method_name(request.method());
    let path = request
        .uri()
        .path()
        .trim_start_matches("/api")
        .to_string();
    let query = request.uri().query().map(str::to_string);
    let headers = request.headers().clone();
    let is_multipart = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let mut form = None;
    let mut body = None;
    let mut body_len = 0;
    if is_multipart {
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        form = Some(read_form(multipart).await);
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap();
        body_len = bytes.len();
        body = serde_json::from_slice::<Value>(&bytes).ok();
    }

    let mut state = state.lock().unwrap();
    state.record(method, path.clone(), &headers);
    if let Some(last) = state.requests.last_mut() {
        last.query = query.clone();
        last.body_len = body_len;
    }
    if let Some(form) = form {
        state.last_form = form;
    }
    if body.is_some() {
        state.last_json = body;
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let reply = match (method, segments.as_slice()) {
        ("GET", ["styles"]) => json!({ "styles": [{ "id": 1, "name": "Ink", "image": "ink.png" }] }),
        ("GET", ["styles", id]) => json!({ "style": { "id": id, "name": "Ink" } }),
        ("GET", ["episodes"]) => json!({
            "episodes": [{ "id": "e1", "work_id": "w1", "title": "Pilot", "episode_number": 1 }]
        }),
        ("GET", ["episodes", id]) => json!({ "episode": { "id": id, "title": "Pilot" } }),
        ("GET", ["episodes", _, _, "script"]) => json!({
            "script": "INT. LIGHTHOUSE - NIGHT",
            "expected_duration": 60,
            "shot_duration": 5
        }),
        ("GET", ["episodes", _, _, "storyboard"]) => {
            json!({ "format": query, "shots": [] })
        }
        ("GET", ["content", _, _, shot]) => json!({
            "shot": {
                "id": shot,
                "description": "Keeper climbs the stairs",
                "images": ["shots/a.png", "shots/b.png"],
                "selected_image": "shots/a.png",
                "duration": 5
            }
        }),
        _ => json!({ "success": true }),
    };
    Json(reply).into_response()
}
