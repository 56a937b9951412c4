use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use reconcile::{ReconcileError, reconcile, record_job};
use screentime_core::{UsageRecord, UsageSample};
use screentime_store::Store;
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};

#[derive(Serialize)]
struct ApiError {
    error: String,
}

#[derive(Clone)]
struct AppState {
    db_path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadPayload {
    screen_time_entries: Vec<UsageSample>,
    #[serde(default)]
    device_id: Option<String>,
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserLedgerResponse {
    id: String,
    username: String,
    screen_time_entries: Vec<LedgerEntry>,
}

#[derive(Serialize)]
struct LedgerEntry {
    hour: String,
    seconds: u64,
}

impl From<UsageRecord> for LedgerEntry {
    fn from(record: UsageRecord) -> Self {
        Self {
            hour: record.hour,
            seconds: record.seconds,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let app_dir = resolve_app_dir().or_else(|| std::env::current_dir().ok());
    let db_path = resolve_db_path_with(
        std::env::var_os("SCREENTIME_DB").map(PathBuf::from),
        app_dir.clone(),
    );
    let public_dir = resolve_public_dir_with(
        std::env::var_os("SCREENTIME_PUBLIC_DIR").map(PathBuf::from),
        app_dir,
    );
    if let Err(err) = setup_store(&db_path) {
        log::error!("failed to initialize store: {}", err);
        std::process::exit(1);
    }
    let state = AppState { db_path };
    let app = build_app_with_static(state, &public_dir);

    let addr = std::env::var("SCREENTIME_ADDR").unwrap_or_else(|_| "127.0.0.1:8090".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind server");
    log::info!("listening on http://{}", addr);
    axum::serve(listener, app).await.expect("serve");
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/users/:id/upload", post(upload))
        .route("/users/:id", get(user_ledger))
        .with_state(state)
}

fn build_app_with_static(state: AppState, public_dir: &Path) -> Router {
    let static_service =
        ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));
    build_app(state).fallback_service(static_service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    body: Bytes,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ApiError>)> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(to_bad_request("user id is required"));
    }
    let payload: UploadPayload = serde_json::from_slice(&body)
        .map_err(|err| to_bad_request(format!("failed to parse request body: {}", err)))?;
    log::info!(
        "upload from user={} device={} samples={}",
        id,
        payload.device_id.as_deref().unwrap_or("unknown"),
        payload.screen_time_entries.len()
    );

    let mut store = open_store(&state)?;
    // Best-effort audit trail; never blocks the reconciliation result.
    if let Err(err) = record_job(&mut store, &id) {
        log::warn!("failed to append job record for user={}: {}", id, err);
    }

    let report =
        reconcile(&mut store, &id, &payload.screen_time_entries).map_err(to_reconcile_error)?;
    log::info!(
        "reconciled user={}: inserted={} updated={} skipped={} issues={}",
        id,
        report.inserted,
        report.updated,
        report.skipped,
        report.issues.len()
    );
    Ok(Json(UploadResponse { success: true }))
}

async fn user_ledger(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<UserLedgerResponse>, (StatusCode, Json<ApiError>)> {
    let store = open_store(&state)?;
    let user = store
        .find_user_by_id(&id)
        .map_err(to_api_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError {
                    error: "user not found".to_string(),
                }),
            )
        })?;
    let records = store.list_usage_records(&user.id).map_err(to_api_error)?;
    Ok(Json(UserLedgerResponse {
        id: user.id,
        username: user.username,
        screen_time_entries: records.into_iter().map(LedgerEntry::from).collect(),
    }))
}

fn open_store(state: &AppState) -> Result<Store, (StatusCode, Json<ApiError>)> {
    Store::open(&state.db_path).map_err(to_api_error)
}

fn setup_store(path: &Path) -> Result<(), screentime_store::StoreError> {
    let mut store = Store::open(path)?;
    store.migrate()?;
    Ok(())
}

fn to_reconcile_error(err: ReconcileError) -> (StatusCode, Json<ApiError>) {
    match err {
        ReconcileError::EmptyUser => to_bad_request(err),
        ReconcileError::Store(_) => to_api_error(err),
    }
}

fn to_api_error(err: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

fn to_bad_request(err: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

fn resolve_app_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
}

fn resolve_db_path_with(env_override: Option<PathBuf>, app_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = env_override {
        return path;
    }
    let base = app_dir.unwrap_or_else(|| PathBuf::from("."));
    base.join("screentime.sqlite")
}

fn resolve_public_dir_with(env_override: Option<PathBuf>, app_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if let Some(dir) = app_dir {
        let candidate = dir.join("public");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("public")
}
