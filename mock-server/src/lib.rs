//! In-memory fake of the Pushbullet v2 API plus a signed-upload storage
//! endpoint, for exercising the client over real HTTP.
//!
//! Every `/v2` route requires `Authorization: Basic base64("{MOCK_TOKEN}:")`.
//! The storage routes (`/upload`, `/files/{key}`) are unauthenticated, like
//! the real storage backend.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const MOCK_TOKEN: &str = "mock-token";

/// Fields the storage upload must carry besides the file itself.
pub const SIGNING_FIELDS: [&str; 6] = [
    "awsaccesskeyid",
    "acl",
    "key",
    "signature",
    "policy",
    "content-type",
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub iden: String,
    pub tag: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Default)]
pub struct Store {
    pub user: Map<String, Value>,
    pub devices: Vec<Map<String, Value>>,
    pub contacts: Vec<Map<String, Value>>,
    pub pushes: Vec<Map<String, Value>>,
    pub subscriptions: Vec<Value>,
    pub channels: Vec<Channel>,
    /// Uploaded files by storage key.
    pub files: HashMap<String, Vec<u8>>,
}

impl Store {
    fn seeded() -> Self {
        let mut user = Map::new();
        user.insert("iden".into(), "ujpah72o0".into());
        user.insert("email".into(), "elon@teslamotors.com".into());
        user.insert("email_normalized".into(), "elon@teslamotors.com".into());
        user.insert("name".into(), "Elon Musk".into());
        user.insert("created".into(), 1381092887.398433.into());
        user.insert("modified".into(), now().into());
        user.insert(
            "preferences".into(),
            serde_json::json!({"onboarding": {"app": false, "friends": false, "extension": false}, "social": false}),
        );

        Self {
            user,
            channels: vec![Channel {
                iden: "ujxPklLhvyKsjAvkMyTVh6".into(),
                tag: "jblow".into(),
                name: "Jonathan Blow".into(),
                description: "New comments on the web by Jonathan Blow.".into(),
                image_url: "https://pushbullet.imgix.net/ujxPklLhvyK.jpeg".into(),
            }],
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));

    let api = Router::new()
        .route("/users/me", get(get_me).post(update_me))
        .route("/devices", get(list_devices).post(create_device))
        .route("/devices/{iden}", post(update_device).delete(delete_device))
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/{iden}", post(update_contact).delete(delete_contact))
        .route("/pushes", get(list_pushes).post(create_push))
        .route("/pushes/{iden}", post(update_push).delete(delete_push))
        .route("/subscriptions", get(list_subscriptions).post(subscribe))
        .route("/subscriptions/{iden}", axum::routing::delete(unsubscribe))
        .route("/channel-info", get(channel_info))
        .route("/upload-request", post(upload_request))
        .layer(middleware::from_fn(require_token));

    Router::new()
        .nest("/v2", api)
        .route("/upload", post(storage_upload))
        .route("/files/{key}", get(download))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub fn basic_auth(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{token}:")))
}

async fn require_token(req: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == basic_auth(MOCK_TOKEN));
    if !authorized {
        tracing::debug!(uri = %req.uri(), "rejecting unauthenticated request");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

type Object = Map<String, Value>;
type ApiResult = Result<Json<Value>, StatusCode>;

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn new_iden() -> String {
    Uuid::new_v4().simple().to_string()
}

fn require(body: &Object, fields: &[&str]) -> Result<(), StatusCode> {
    if fields.iter().all(|f| body.contains_key(*f)) {
        Ok(())
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

fn insert_record(list: &mut Vec<Object>, mut body: Object) -> Value {
    let ts = now();
    body.insert("iden".into(), new_iden().into());
    body.insert("active".into(), true.into());
    body.insert("created".into(), ts.into());
    body.insert("modified".into(), ts.into());
    list.push(body.clone());
    Value::Object(body)
}

fn update_record(list: &mut [Object], iden: &str, body: Object) -> ApiResult {
    let record = list
        .iter_mut()
        .find(|r| r.get("iden").and_then(Value::as_str) == Some(iden))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (k, v) in body {
        if k != "iden" {
            record.insert(k, v);
        }
    }
    record.insert("modified".into(), now().into());
    Ok(Json(Value::Object(record.clone())))
}

fn delete_record(list: &mut Vec<Object>, iden: &str) -> Result<Json<Value>, StatusCode> {
    let before = list.len();
    list.retain(|r| r.get("iden").and_then(Value::as_str) != Some(iden));
    if list.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(Value::Object(Map::new())))
}

fn envelope(name: &str, items: Vec<Value>) -> Json<Value> {
    let mut map = Map::new();
    map.insert(name.into(), Value::Array(items));
    Json(Value::Object(map))
}

fn to_values(list: &[Object]) -> Vec<Value> {
    list.iter().cloned().map(Value::Object).collect()
}

// --- user ---

async fn get_me(State(db): State<Db>) -> Json<Value> {
    Json(Value::Object(db.read().await.user.clone()))
}

async fn update_me(State(db): State<Db>, Json(body): Json<Object>) -> Json<Value> {
    let mut store = db.write().await;
    for (k, v) in body {
        store.user.insert(k, v);
    }
    store.user.insert("modified".into(), now().into());
    Json(Value::Object(store.user.clone()))
}

// --- devices ---

async fn list_devices(State(db): State<Db>) -> Json<Value> {
    envelope("devices", to_values(&db.read().await.devices))
}

async fn create_device(State(db): State<Db>, Json(body): Json<Object>) -> ApiResult {
    require(&body, &["nickname", "type"])?;
    Ok(Json(insert_record(&mut db.write().await.devices, body)))
}

async fn update_device(
    State(db): State<Db>,
    Path(iden): Path<String>,
    Json(body): Json<Object>,
) -> ApiResult {
    update_record(&mut db.write().await.devices, &iden, body)
}

async fn delete_device(State(db): State<Db>, Path(iden): Path<String>) -> ApiResult {
    delete_record(&mut db.write().await.devices, &iden)
}

// --- contacts ---

async fn list_contacts(State(db): State<Db>) -> Json<Value> {
    envelope("contacts", to_values(&db.read().await.contacts))
}

async fn create_contact(State(db): State<Db>, Json(mut body): Json<Object>) -> ApiResult {
    require(&body, &["name", "email"])?;
    if let Some(email) = body.get("email").and_then(Value::as_str) {
        let normalized = email.to_lowercase();
        body.insert("email_normalized".into(), normalized.into());
    }
    Ok(Json(insert_record(&mut db.write().await.contacts, body)))
}

async fn update_contact(
    State(db): State<Db>,
    Path(iden): Path<String>,
    Json(body): Json<Object>,
) -> ApiResult {
    update_record(&mut db.write().await.contacts, &iden, body)
}

async fn delete_contact(State(db): State<Db>, Path(iden): Path<String>) -> ApiResult {
    delete_record(&mut db.write().await.contacts, &iden)
}

// --- pushes ---

#[derive(Deserialize)]
struct PushQuery {
    modified_after: Option<f64>,
}

async fn list_pushes(State(db): State<Db>, Query(query): Query<PushQuery>) -> Json<Value> {
    let store = db.read().await;
    let after = query.modified_after.unwrap_or(f64::MIN);
    let pushes = store
        .pushes
        .iter()
        .filter(|p| p.get("modified").and_then(Value::as_f64).unwrap_or(0.0) > after)
        .cloned()
        .map(Value::Object)
        .collect();
    envelope("pushes", pushes)
}

async fn create_push(State(db): State<Db>, Json(body): Json<Object>) -> ApiResult {
    require(&body, &["type"])?;
    match body.get("type").and_then(Value::as_str) {
        Some("link") => require(&body, &["link"])?,
        Some("address") => require(&body, &["address"])?,
        Some("list") => require(&body, &["items"])?,
        Some("file") => require(&body, &["file_name", "file_type", "file_url"])?,
        Some("note") => {}
        _ => return Err(StatusCode::BAD_REQUEST),
    }
    let mut store = db.write().await;
    let mut body = body;
    if let Some(Value::String(email)) = store.user.get("email") {
        body.insert("sender_email".into(), email.clone().into());
    }
    body.insert("dismissed".into(), false.into());
    Ok(Json(insert_record(&mut store.pushes, body)))
}

async fn update_push(
    State(db): State<Db>,
    Path(iden): Path<String>,
    Json(body): Json<Object>,
) -> ApiResult {
    update_record(&mut db.write().await.pushes, &iden, body)
}

async fn delete_push(State(db): State<Db>, Path(iden): Path<String>) -> ApiResult {
    delete_record(&mut db.write().await.pushes, &iden)
}

// --- subscriptions and channels ---

async fn list_subscriptions(State(db): State<Db>) -> Json<Value> {
    envelope("subscriptions", db.read().await.subscriptions.clone())
}

#[derive(Deserialize)]
struct SubscribeInput {
    channel_tag: String,
}

async fn subscribe(State(db): State<Db>, Json(input): Json<SubscribeInput>) -> ApiResult {
    let mut store = db.write().await;
    let channel = store
        .channels
        .iter()
        .find(|c| c.tag == input.channel_tag)
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;
    let ts = now();
    let subscription = serde_json::json!({
        "iden": new_iden(),
        "active": true,
        "created": ts,
        "modified": ts,
        "channel": channel,
    });
    store.subscriptions.push(subscription.clone());
    Ok(Json(subscription))
}

async fn unsubscribe(State(db): State<Db>, Path(iden): Path<String>) -> ApiResult {
    let mut store = db.write().await;
    let before = store.subscriptions.len();
    store.subscriptions.retain(|s| s["iden"] != iden.as_str());
    if store.subscriptions.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(Value::Object(Map::new())))
}

async fn channel_info(
    State(db): State<Db>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Channel>, StatusCode> {
    let tag = query.get("tag").ok_or(StatusCode::BAD_REQUEST)?;
    let store = db.read().await;
    store
        .channels
        .iter()
        .find(|c| &c.tag == tag)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- uploads ---

#[derive(Deserialize)]
struct UploadRequestInput {
    file_name: String,
    file_type: String,
}

/// Tickets point back at this server, so the upload URL is derived from the
/// request's Host header.
async fn upload_request(headers: HeaderMap, Json(input): Json<UploadRequestInput>) -> ApiResult {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let key = format!("{}-{}", new_iden(), input.file_name);
    Ok(Json(serde_json::json!({
        "file_name": input.file_name,
        "file_type": input.file_type,
        "file_url": format!("http://{host}/files/{key}"),
        "upload_url": format!("http://{host}/upload"),
        "data": {
            "awsaccesskeyid": "AKIAMOCKMOCKMOCK",
            "acl": "public-read",
            "key": key,
            "signature": "bW9jay1zaWduYXR1cmU=",
            "policy": "bW9jay1wb2xpY3k=",
            "content-type": input.file_type,
        }
    })))
}

async fn storage_upload(State(db): State<Db>, mut multipart: Multipart) -> StatusCode {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return StatusCode::BAD_REQUEST,
        };
        let name = field.name().unwrap_or_default().to_string();
        let Ok(bytes) = field.bytes().await else {
            return StatusCode::BAD_REQUEST;
        };
        if name == "file" {
            file = Some(bytes.to_vec());
        } else {
            fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    let (Some(file), true) = (file, SIGNING_FIELDS.iter().all(|f| fields.contains_key(*f))) else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(key) = fields.remove("key") else {
        return StatusCode::BAD_REQUEST;
    };
    tracing::debug!(%key, size = file.len(), "stored upload");
    db.write().await.files.insert(key, file);
    StatusCode::NO_CONTENT
}

async fn download(State(db): State<Db>, Path(key): Path<String>) -> Result<Vec<u8>, StatusCode> {
    db.read()
        .await
        .files
        .get(&key)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}
