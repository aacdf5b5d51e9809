//! HTTP API layer for the rental gateway.

pub mod broadcast;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
