//! JSON REST endpoints for the dashboard front end.
//!
//! Each request reloads the task file, so edits made by another process are
//! visible on the next call. Requests are served one at a time against the
//! store.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::error::StoreError;
use crate::tasks::views::{assignees, status_counts};
use crate::tasks::{NewTask, Priority, Task, TaskFilter, TaskStatus, TaskStore, Urgency, classify};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<TaskStore>>,
}

impl AppState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Build the Axum router with the task REST routes.
pub fn task_routes(store: TaskStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(list_tasks).post(add_task))
        .route("/api/tasks/stats", get(task_stats))
        .route("/api/assignees", get(list_assignees))
        .route("/api/tasks/{id}/status", post(update_status))
        .route("/api/tasks/{id}/priority", post(update_priority))
        .route("/api/tasks/{id}/kpi-deadline", post(update_kpi_deadline))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(store))
}

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e @ StoreError::TaskNotFound { .. }) => {
                warn!(error = %e, "Task lookup failed");
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Store(e @ StoreError::Unavailable { .. }) => {
                error!(error = %e, "Task store unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Views ───────────────────────────────────────────────────────────────

/// Query string shared by the list and stats endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub assigned_to: Option<String>,
    /// Comma-separated priorities, e.g. `High,Low`.
    pub priority: Option<String>,
}

impl ViewQuery {
    fn to_filter(&self) -> Result<TaskFilter, ApiError> {
        let mut filter = TaskFilter::default();
        if let Some(who) = self.assigned_to.as_deref().filter(|w| !w.is_empty()) {
            filter = filter.assigned_to(who);
        }
        if let Some(raw) = &self.priority {
            let priorities = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| p.parse::<Priority>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(ApiError::BadRequest)?;
            filter = filter.priorities(priorities);
        }
        Ok(filter)
    }
}

/// A task plus its highlight bucket for today.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub label: String,
    pub urgency: Urgency,
}

impl TaskView {
    fn new(task: &Task, today: NaiveDate) -> Self {
        Self {
            label: task.label(),
            urgency: classify(&task.deadline, task.status, today),
            task: task.clone(),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let filter = query.to_filter()?;
    let store = state.store.lock().await;
    let table = store.load().await?;

    let today = today();
    let views = filter
        .apply(&table)
        .into_iter()
        .map(|t| TaskView::new(t, today))
        .collect();
    Ok(Json(views))
}

async fn task_stats(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.to_filter()?;
    let store = state.store.lock().await;
    let table = store.load().await?;

    let selected = filter.apply(&table);
    let by_status: Vec<_> = status_counts(selected.iter().copied())
        .into_iter()
        .map(|(status, count)| serde_json::json!({ "status": status, "count": count }))
        .collect();

    Ok(Json(serde_json::json!({
        "total": selected.len(),
        "by_status": by_status,
    })))
}

async fn list_assignees(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let store = state.store.lock().await;
    let table = store.load().await?;
    Ok(Json(assignees(&table)))
}

// ── Mutations ───────────────────────────────────────────────────────────

async fn add_task(
    State(state): State<AppState>,
    Json(body): Json<NewTask>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.lock().await;
    let mut table = store.load().await?;
    let task = store.add_task(&mut table, body).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Task>, ApiError> {
    let store = state.store.lock().await;
    let mut table = store.load().await?;
    Ok(Json(store.update_status(&mut table, id, body.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub priority: Priority,
}

async fn update_priority(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<PriorityRequest>,
) -> Result<Json<Task>, ApiError> {
    let store = state.store.lock().await;
    let mut table = store.load().await?;
    Ok(Json(store.update_priority(&mut table, id, body.priority).await?))
}

#[derive(Debug, Deserialize)]
pub struct KpiDeadlineRequest {
    pub kpi: String,
    pub deadline: NaiveDate,
}

async fn update_kpi_deadline(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<KpiDeadlineRequest>,
) -> Result<Json<Task>, ApiError> {
    let store = state.store.lock().await;
    let mut table = store.load().await?;
    Ok(Json(
        store
            .update_kpi_deadline(&mut table, id, body.kpi, body.deadline)
            .await?,
    ))
}
