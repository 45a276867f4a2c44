//! HTTP surface of the snip URL shortener.

pub mod app;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::{App, HttpOptions};
pub use cors::CorsOrigin;
pub use state::AppState;
