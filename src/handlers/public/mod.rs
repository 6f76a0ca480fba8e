// handlers/public/mod.rs - Handlers reachable without a session
//
// Route prefix: none (/, /health, /login, /logout)
// Middleware: none

pub mod health;
pub mod login;
pub mod logout;

pub use health::{health, root};
pub use login::{login_get, login_post};
pub use logout::logout_get;
