// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session + allow-list, enforced by
// middleware::require_admin on the /dashboard router).

pub mod protected;
pub mod public;
