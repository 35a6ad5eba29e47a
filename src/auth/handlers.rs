use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::{
    dto::{LoginRequest, TokenResponse},
    extractors::CurrentUser,
    jwt::JwtKeys,
    password::verify_password,
    repo::{self, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // OAuth2 password-form endpoint and the JSON variant the SPA uses.
        .route("/token", post(login_form))
        .route("/api/login", post(login_json))
        .route("/users/me", get(me))
}

#[instrument(skip(state, form))]
async fn login_form(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    login(&state, &form.username, &form.password).await.map(Json)
}

#[instrument(skip(state, payload))]
async fn login_json(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    login(&state, &payload.username, &payload.password)
        .await
        .map(Json)
}

#[instrument(skip(user))]
async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Unknown email and wrong password produce the identical failure so the
/// response never confirms whether an account exists.
async fn login(state: &AppState, username: &str, password: &str) -> Result<TokenResponse, AppError> {
    let Some(user) = repo::find_by_email(state, username).await? else {
        warn!(email = %username, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %username, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(state).sign(&user.email)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(TokenResponse::bearer(token))
}
