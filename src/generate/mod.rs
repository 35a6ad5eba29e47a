use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod llm;
pub mod prompts;

pub fn router() -> Router<AppState> {
    handlers::generate_routes()
}
