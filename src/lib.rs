pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod reports;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;

pub use routes::app;
pub use state::AppState;
