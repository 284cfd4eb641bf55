pub mod auth;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;
pub mod upload;

// Re-export the router builder and state so the binary and the integration
// tests can wire the service in one place.
pub use router::build_router;
pub use state::{Adapters, AppState};
