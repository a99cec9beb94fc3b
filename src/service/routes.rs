//! Axum routes for the Tier Board service.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::persistence::IntegrityIssue;
use crate::reducer::DropTarget;
use crate::session::{BoardSession, MoveOutcome, SessionError};
use crate::store::{PostgresRatingStore, RatingStore};
use crate::types::{Bucket, RatingScope, ReadingId};
use crate::view::BoardView;
use crate::TIER_BOARD_SCHEMA_VERSION;

use super::middleware::{record_move, record_save};
use super::state::{ServiceState, SessionHandle};

/// Type alias for the service state with PostgresRatingStore.
pub type AppState = ServiceState<PostgresRatingStore>;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// A drop target as sent by a client.
///
/// Either the structured form (`{"kind": "container", "id": "S"}`) or a
/// legacy drag id string (`"tier:S"`, or a reading id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetInput {
    /// Structured target.
    Structured(DropTarget),
    /// Legacy drag id.
    Legacy(String),
}

impl TargetInput {
    fn resolve(self) -> Result<DropTarget, ApiError> {
        match self {
            Self::Structured(target) => Ok(target),
            Self::Legacy(raw) => DropTarget::parse(&raw).map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, "INVALID_TARGET", e.to_string())
            }),
        }
    }
}

fn resolve_target(target: Option<TargetInput>) -> Result<Option<DropTarget>, ApiError> {
    target.map(TargetInput::resolve).transpose()
}

/// A complete drag-end event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Dragged reading.
    pub active: ReadingId,
    /// Where it was released; absent when dropped outside every bucket.
    #[serde(default)]
    pub target: Option<TargetInput>,
}

/// Transient drag feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DragRequest {
    /// Pointer-down on a card.
    Begin {
        /// Card being picked up.
        reading_id: ReadingId,
    },
    /// Pointer moved.
    Hover {
        /// Target under the pointer.
        #[serde(default)]
        target: Option<TargetInput>,
    },
    /// Drag abandoned.
    Cancel,
    /// Pointer released.
    End {
        /// Target under the pointer.
        #[serde(default)]
        target: Option<TargetInput>,
    },
}

/// Wire form of a move outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDto {
    /// Whether the board changed.
    pub moved: bool,
    /// Bucket left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Bucket>,
    /// Bucket entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Bucket>,
    /// Final index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Why nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&MoveOutcome> for OutcomeDto {
    fn from(outcome: &MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Moved { from, to, index } => Self {
                moved: true,
                from: Some(*from),
                to: Some(*to),
                index: Some(*index),
                reason: None,
            },
            MoveOutcome::Ignored(rejection) => Self {
                moved: false,
                from: None,
                to: None,
                index: None,
                reason: Some(rejection.code().to_string()),
            },
        }
    }
}

fn outcome_label(outcome: &MoveOutcome) -> &'static str {
    match outcome {
        MoveOutcome::Moved { .. } => "moved",
        MoveOutcome::Ignored(rejection) => rejection.code(),
    }
}

/// Club years with readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearsResponse {
    /// Newest first.
    pub years: Vec<i32>,
}

/// A newly opened session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Id for subsequent calls.
    pub session_id: Uuid,
    /// Initial board.
    pub view: BoardView,
    /// Saved rows that could not be placed.
    pub dropped: Vec<IntegrityIssue>,
}

/// Current board of an existing session.
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    /// Session id.
    pub session_id: Uuid,
    /// Board.
    pub view: BoardView,
}

/// Result of a move or drag call.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    /// Whether the gesture was accepted.
    pub accepted: bool,
    /// Drop result, for gestures that end a drag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeDto>,
    /// Board after the gesture.
    pub view: BoardView,
}

/// Result of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveResponse {
    /// Rows written.
    pub rows: usize,
    /// Board after the save.
    pub view: BoardView,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub open_sessions: usize,
    pub session_capacity: usize,
    /// Database connectivity status.
    pub database: DatabaseHealth,
}

/// Database health information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub connected: bool,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
    pub details: Option<String>,
}

/// Structured error response with correlation ID for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Correlation ID for request tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            correlation_id: None,
            details: None,
        }
    }

    /// Add a correlation ID to the error.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(code, error)))
}

fn session_handle<S: RatingStore + 'static>(state: &ServiceState<S>, id: &Uuid) -> Result<SessionHandle, ApiError> {
    state.sessions.get(id).ok_or_else(|| {
        api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("Session not found: {}", id))
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// List club years for the ratings home page.
async fn years_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<YearsResponse>, ApiError> {
    let years = state.store.list_years().await.map_err(|e| {
        api_error(StatusCode::BAD_GATEWAY, "STORE_FAILED", format!("Failed to list years: {}", e))
    })?;
    Ok(Json(YearsResponse { years }))
}

/// Open an editing session on a board.
async fn open_session_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(scope): Path<String>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let scope = RatingScope::from_str(&scope).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "INVALID_SCOPE",
                "Board scope must be a year or \"all-time\"",
            ).with_details(scope.clone())),
        )
    })?;

    let session = BoardSession::open(state.store.as_ref(), scope, state.clock())
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, "LOAD_FAILED", e.to_string()))?;

    let view = BoardView::render(&session);
    let dropped = session.integrity().dropped.clone();
    let (session_id, _) = state.sessions.insert(session);

    tracing::info!(session_id = %session_id, scope = %scope, "Opened board session");

    Ok((StatusCode::CREATED, Json(SessionResponse { session_id, view, dropped })))
}

/// Current board of a session.
async fn view_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewResponse>, ApiError> {
    let handle = session_handle(&state, &id)?;
    let session = handle.lock().await;
    Ok(Json(ViewResponse { session_id: id, view: BoardView::render(&session) }))
}

/// Apply a complete drag-end event.
async fn move_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let target = resolve_target(request.target)?;
    let handle = session_handle(&state, &id)?;
    let mut session = handle.lock().await;

    let outcome = match target {
        Some(target) => session.apply(&request.active, &target),
        None => MoveOutcome::Ignored(crate::reducer::MoveRejection::NoTarget),
    };
    record_move(outcome_label(&outcome));

    Ok(Json(MoveResponse {
        accepted: outcome.is_moved(),
        outcome: Some(OutcomeDto::from(&outcome)),
        view: BoardView::render(&session),
    }))
}

/// Drag feedback.
async fn drag_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let handle = session_handle(&state, &id)?;
    let mut session = handle.lock().await;

    let (accepted, outcome) = match request {
        DragRequest::Begin { reading_id } => (session.begin_drag(&reading_id), None),
        DragRequest::Hover { target } => {
            let target = resolve_target(target)?;
            session.hover(target.as_ref());
            (session.dragging().is_some(), None)
        }
        DragRequest::Cancel => {
            session.cancel_drag();
            (true, None)
        }
        DragRequest::End { target } => {
            let target = resolve_target(target)?;
            let outcome = session.end_drag(target.as_ref());
            record_move(outcome_label(&outcome));
            (outcome.is_moved(), Some(OutcomeDto::from(&outcome)))
        }
    };

    Ok(Json(MoveResponse {
        accepted,
        outcome,
        view: BoardView::render(&session),
    }))
}

/// Save a board.
///
/// The session lock is released while the store works, so gestures that
/// arrive meanwhile are answered with a `saving` rejection. The write runs
/// on its own task and always settles the session, even if the client goes
/// away before it finishes.
async fn save_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaveResponse>, ApiError> {
    let handle = session_handle(&state, &id)?;

    let pending = {
        let mut session = handle.lock().await;
        session.begin_save().map_err(|e| {
            api_error(StatusCode::CONFLICT, "SAVE_IN_PROGRESS", e.to_string())
        })?
    };

    let store = Arc::clone(&state.store);
    let task = tokio::spawn(async move {
        let start = Instant::now();
        let rows = pending.rows.len();
        let result = store
            .replace_ratings(pending.scope, &pending.rows)
            .await
            .map_err(SessionError::from_store);

        let mut session = handle.lock().await;
        let saved = session.finish_save(pending, result);
        record_save(rows, saved.is_ok(), start.elapsed().as_millis() as u64);
        (saved, BoardView::render(&session))
    });

    let (saved, view) = task.await.map_err(|e| {
        tracing::error!(session_id = %id, error = %e, "Save task did not complete");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "SAVE_ABORTED", e.to_string())
    })?;

    match saved {
        Ok(rows) => Ok(Json(SaveResponse { rows, view })),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new("SAVE_FAILED", e.to_string())
                .with_correlation_id(id.to_string())
                .with_details("Edits are kept; retry the save")),
        )),
    }
}

/// Abandon a session. Nothing is written.
async fn close_session_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).ok_or_else(|| {
        api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("Session not found: {}", id))
    })?;
    tracing::info!(session_id = %id, "Abandoned board session");
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint (detailed).
async fn health_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<HealthResponse> {
    let db_healthy = state.store.is_healthy().await;

    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: TIER_BOARD_SCHEMA_VERSION.to_string(),
        open_sessions: state.sessions.len(),
        session_capacity: state.sessions.capacity(),
        database: DatabaseHealth { connected: db_healthy },
    })
}

/// Liveness probe endpoint.
///
/// Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 if the store is reachable, 503 otherwise.
async fn readiness_handler<S: RatingStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.store.is_healthy().await {
        Ok(Json(ReadinessResponse {
            ready: true,
            database: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                database: false,
                details: Some("Database connection failed".to_string()),
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the Tier Board service.
pub fn create_router<S: RatingStore + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/years", get(years_handler::<S>))
        // Sessions
        .route("/api/boards/:scope/sessions", post(open_session_handler::<S>))
        .route("/api/sessions/:id", get(view_handler::<S>).delete(close_session_handler::<S>))
        .route("/api/sessions/:id/moves", post(move_handler::<S>))
        .route("/api/sessions/:id/drag", post(drag_handler::<S>))
        .route("/api/sessions/:id/save", post(save_handler::<S>))
        // Health checks
        .route("/health", get(health_handler::<S>))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler::<S>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ReadingClock;
    use crate::service::state::SessionConfig;
    use crate::store::memory::InMemoryError;
    use crate::store::InMemoryRatingStore;
    use crate::types::{Book, BookId, RatingRow, Reading, Tier};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    fn seed(store: &InMemoryRatingStore) {
        store.add_book(Book::new("b1", "Hamlet", "William Shakespeare"));
        store.add_book(Book::new("b2", "Beloved", "Toni Morrison"));
        store.add_reading(Reading::new("r1", "b1", 2024, 1, 1));
        store.add_reading(Reading::new("r2", "b2", 2024, 9, 9));
        store.insert_ratings(RatingScope::Year(2024), vec![RatingRow::new("gone", Tier::S, 0)]);
    }

    /// Store whose writes wait until a permit is released.
    struct GatedStore {
        inner: InMemoryRatingStore,
        gate: Semaphore,
    }

    #[async_trait]
    impl RatingStore for GatedStore {
        type Error = InMemoryError;

        async fn list_years(&self) -> Result<Vec<i32>, Self::Error> {
            self.inner.list_years().await
        }

        async fn load_readings(&self, scope: RatingScope) -> Result<Vec<Reading>, Self::Error> {
            self.inner.load_readings(scope).await
        }

        async fn load_books(&self, ids: &[BookId]) -> Result<Vec<Book>, Self::Error> {
            self.inner.load_books(ids).await
        }

        async fn load_ratings(&self, scope: RatingScope) -> Result<Vec<RatingRow>, Self::Error> {
            self.inner.load_ratings(scope).await
        }

        async fn replace_ratings(&self, scope: RatingScope, rows: &[RatingRow]) -> Result<(), Self::Error> {
            let _permit = self.gate.acquire().await.unwrap();
            self.inner.replace_ratings(scope, rows).await
        }
    }

    fn app() -> (Router, Arc<InMemoryRatingStore>) {
        let store = InMemoryRatingStore::new();
        seed(&store);

        let state = ServiceState::new(store, SessionConfig { capacity: 8 })
            .with_clock(ReadingClock::new(2024, 6));
        let store = Arc::clone(&state.store);
        (create_router(state), store)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn open(app: &Router) -> (String, Value) {
        let (status, body) = call(app, "POST", "/api/boards/2024/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        (body["session_id"].as_str().unwrap().to_string(), body)
    }

    #[tokio::test]
    async fn test_years() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/api/years", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["years"], json!([2024]));
    }

    #[tokio::test]
    async fn test_open_reports_dropped_rows() {
        let (app, _) = app();
        let (_, body) = open(&app).await;

        assert_eq!(body["dropped"][0]["issue"], "unknown_reading");
        assert_eq!(body["view"]["rows"][6]["cards"].as_array().unwrap().len(), 2);
        // r2 ends in September, after the pinned clock.
        assert_eq!(body["view"]["rows"][6]["cards"][1]["locked"], true);
    }

    #[tokio::test]
    async fn test_invalid_scope() {
        let (app, _) = app();
        let (status, body) = call(&app, "POST", "/api/boards/someday/sessions", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_SCOPE");
    }

    #[tokio::test]
    async fn test_move_and_save() {
        let (app, store) = app();
        let (id, _) = open(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/sessions/{}/moves", id),
            Some(json!({"active": "r1", "target": {"kind": "container", "id": "S"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["moved"], true);
        assert_eq!(body["view"]["dirty"], true);

        let (_, body) = call(
            &app,
            "POST",
            &format!("/api/sessions/{}/moves", id),
            Some(json!({"active": "r2", "target": "tier:A"})),
        )
        .await;
        assert_eq!(body["outcome"]["reason"], "locked");

        let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/save", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 1);
        assert_eq!(body["view"]["dirty"], false);
        assert_eq!(store.ratings(RatingScope::Year(2024)), vec![RatingRow::new("r1", Tier::S, 0)]);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_session() {
        let (app, store) = app();
        let (id, _) = open(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/sessions/{}/moves", id),
            Some(json!({"active": "r1", "target": "tier:B"})),
        )
        .await;

        store.fail_writes(true);
        let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/save", id), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "SAVE_FAILED");

        let (status, body) = call(&app, "GET", &format!("/api/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["dirty"], true);
        assert_eq!(body["view"]["rows"][2]["cards"][0]["reading_id"], "r1");
    }

    #[tokio::test]
    async fn test_save_settles_after_client_disconnects() {
        let inner = InMemoryRatingStore::new();
        seed(&inner);
        let state = ServiceState::new(GatedStore { inner, gate: Semaphore::new(0) }, SessionConfig { capacity: 8 })
            .with_clock(ReadingClock::new(2024, 6));
        let store = Arc::clone(&state.store);
        let app = create_router(state);

        let (id, _) = open(&app).await;
        let moves = format!("/api/sessions/{}/moves", id);
        let save = format!("/api/sessions/{}/save", id);
        call(&app, "POST", &moves, Some(json!({"active": "r1", "target": "tier:S"}))).await;

        // The client gives up while the write is still blocked.
        let abandoned = tokio::time::timeout(Duration::from_millis(100), call(&app, "POST", &save, None)).await;
        assert!(abandoned.is_err());

        let (status, body) = call(&app, "POST", &save, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "SAVE_IN_PROGRESS");
        let (_, body) = call(&app, "POST", &moves, Some(json!({"active": "r1", "target": "tier:A"}))).await;
        assert_eq!(body["outcome"]["reason"], "saving");

        store.gate.add_permits(1);

        let mut settled = Value::Null;
        for _ in 0..100 {
            let (_, body) = call(&app, "GET", &format!("/api/sessions/{}", id), None).await;
            if body["view"]["saving"] == false {
                settled = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(settled["view"]["saving"], false);
        assert_eq!(settled["view"]["dirty"], false);
        assert_eq!(store.inner.ratings(RatingScope::Year(2024)), vec![RatingRow::new("r1", Tier::S, 0)]);

        let (_, body) = call(&app, "POST", &moves, Some(json!({"active": "r1", "target": "tier:A"}))).await;
        assert_eq!(body["outcome"]["moved"], true);
    }

    #[tokio::test]
    async fn test_drag_feedback() {
        let (app, _) = app();
        let (id, _) = open(&app).await;
        let uri = format!("/api/sessions/{}/drag", id);

        let (_, body) = call(&app, "POST", &uri, Some(json!({"action": "begin", "reading_id": "r1"}))).await;
        assert_eq!(body["accepted"], true);
        assert_eq!(body["view"]["dragging"], "r1");

        let (_, body) = call(&app, "POST", &uri, Some(json!({"action": "hover", "target": "tier:C"}))).await;
        assert_eq!(body["view"]["hovered"], "C");

        let (_, body) = call(&app, "POST", &uri, Some(json!({"action": "end", "target": "tier:C"}))).await;
        assert_eq!(body["outcome"]["to"], "C");
        assert_eq!(body["view"]["dragging"], Value::Null);

        let (_, body) = call(&app, "POST", &uri, Some(json!({"action": "begin", "reading_id": "r2"}))).await;
        assert_eq!(body["accepted"], false);
    }

    #[tokio::test]
    async fn test_abandon_session() {
        let (app, store) = app();
        let (id, _) = open(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/sessions/{}/moves", id),
            Some(json!({"active": "r1", "target": "tier:S"})),
        )
        .await;

        let (status, _) = call(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, "GET", &format!("/api/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
        assert_eq!(store.ratings(RatingScope::Year(2024)).len(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session_capacity"], 8);

        let (status, _) = call(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
