use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

use super::{
    dto::{CreateProjectRequest, DesignProject, UpdateProjectRequest},
    repo,
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/design/projects",
            get(list_projects).post(create_project),
        )
        .route(
            "/api/design/projects/:id",
            put(update_project).delete(delete_project),
        )
}

#[instrument(skip(state, user))]
async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DesignProject>>, AppError> {
    let projects = repo::list(&state, &user.id).await?;
    Ok(Json(projects))
}

#[instrument(skip(state, user, payload))]
async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<DesignProject>, AppError> {
    let project = repo::create(&state, &user.id, &payload).await?;
    Ok(Json(project))
}

#[instrument(skip(state, user, payload))]
async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<DesignProject>, AppError> {
    let project = repo::update(&state, &project_id, &user.id, &payload).await?;
    Ok(Json(project))
}

#[instrument(skip(state, user))]
async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    repo::delete(&state, &project_id, &user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Project deleted",
    })))
}
