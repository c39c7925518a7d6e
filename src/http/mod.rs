//! HTTP server module.
//!
//! axum front end over the service layer. Callers identify themselves with
//! the `X-User-Id` header (see [`auth`]).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - Request parsing and validation                        │
//! │  - JSON serialization/deserialization                    │
//! │  - CORS, compression, request ids, error mapping         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (crate::services)                         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (crate::db)                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
