use crate::features::auth::handler;
use crate::shared::constants::API_PREFIX;
use axum::{routing::get, Router};

/// Protected auth routes (require JWT authentication)
pub fn protected_routes() -> Router {
    Router::new().route(&format!("{}/auth/me", API_PREFIX), get(handler::get_me))
}
