//! MUN tracker HTTP API
//!
//! ## Endpoints
//!
//! - GET /health - Liveness plus database round trip
//! - GET /committees - List committee summaries, newest first
//! - POST /committees - Create committee
//! - GET /committees/:id - Committee with its portfolios
//! - DELETE /committees/:id - Password-gated delete
//! - POST /committees/:id/verify - Check a committee password
//! - POST /committees/:id/portfolios - Replace the portfolio roster
//! - GET /committees/:id/events - Event log, newest first
//! - POST /committees/:id/events - Record an event
//! - GET /committees/:id/stats - Per-delegate participation

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{build_app, run_server};
pub use state::AppState;
