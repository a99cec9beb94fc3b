//! Tier Board REST Service
//!
//! Exposes board editing sessions as a REST API.
//!
//! ## Endpoints
//!
//! - `GET /api/years` - Club years with readings, newest first
//! - `POST /api/boards/{scope}/sessions` - Open a board (`2024` or `all-time`)
//! - `GET /api/sessions/{id}` - Current board view
//! - `POST /api/sessions/{id}/moves` - Apply a drop
//! - `POST /api/sessions/{id}/drag` - Drag feedback (begin, hover, cancel, end)
//! - `POST /api/sessions/{id}/save` - Full-replace save
//! - `DELETE /api/sessions/{id}` - Abandon without saving
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_move, record_save};
pub use routes::{create_router, AppState, ErrorResponse};
pub use state::{ServiceState, SessionConfig, SessionHandle, SessionRegistry};
