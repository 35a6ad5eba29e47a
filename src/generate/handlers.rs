use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::{
    dto::{GenerateManualRequest, GeneratePosterParams, GenerateVideoParams},
    llm, prompts,
};

pub fn generate_routes() -> Router<AppState> {
    Router::new()
        .route("/api/design/manual/generate", post(generate_manual))
        .route("/api/design/poster/generate", post(generate_poster))
        .route("/api/growth/video/generate", post(generate_video))
}

/// Models sometimes wrap the JSON in markdown fences despite being told not
/// to; strip them before parsing.
fn strip_code_fences(content: &str) -> String {
    lazy_static! {
        static ref FENCE_OPEN: Regex = Regex::new(r"^```(?:json)?\s*").unwrap();
        static ref FENCE_CLOSE: Regex = Regex::new(r"\s*```$").unwrap();
    }
    let trimmed = content.trim();
    let without_open = FENCE_OPEN.replace(trimmed, "");
    FENCE_CLOSE.replace(&without_open, "").to_string()
}

#[instrument(skip(state, payload))]
async fn generate_manual(
    State(state): State<AppState>,
    Json(payload): Json<GenerateManualRequest>,
) -> Result<Json<Value>, AppError> {
    let prompt = prompts::manual_generation_prompt(
        &payload.topic,
        &payload.industry,
        &payload.target_audience,
    );

    let content = state
        .llm
        .generate(llm::SYSTEM_PROMPT, &prompt)
        .await
        .map_err(|e| {
            error!(error = %e, topic = %payload.topic, "manual generation failed");
            AppError::Upstream(format!("AI generation failed: {e}"))
        })?;

    let cleaned = strip_code_fences(&content);
    let slides = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            // Surface the raw text instead of failing the whole request.
            warn!(error = %e, "model returned malformed JSON");
            json!({
                "slides": [
                    { "title": "Error Parsing AI Response", "content": cleaned }
                ]
            })
        }
    };

    Ok(Json(json!({
        "status": "success",
        "message": "Handbook generated successfully",
        "data": slides,
    })))
}

#[instrument]
async fn generate_poster(Query(params): Query<GeneratePosterParams>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": format!("Generating poster for theme: {}", params.theme),
        "image_url": "https://example.com/poster-preview.jpg",
    }))
}

#[instrument]
async fn generate_video(Query(params): Query<GenerateVideoParams>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Video generation task started",
        "task_id": "vid-12345",
        "eta_seconds": 120,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{state_with_llm, CannedLlm};

    #[test]
    fn strips_json_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"slides\":[]}\n```"),
            "{\"slides\":[]}"
        );
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{\"ok\":true}"), "{\"ok\":true}");
    }

    fn manual_request() -> GenerateManualRequest {
        GenerateManualRequest {
            topic: "Solar drones".to_string(),
            target_audience: "Potential Investors".to_string(),
            industry: "Energy".to_string(),
        }
    }

    #[tokio::test]
    async fn parses_fenced_model_output() {
        let state = state_with_llm(Arc::new(CannedLlm::new(
            "```json\n{\"slides\":[{\"title\":\"t\"}]}\n```",
        )));

        let Json(body) = generate_manual(State(state), Json(manual_request()))
            .await
            .expect("generation succeeds");
        assert_eq!(body["status"], json!("success"));
        assert_eq!(body["data"]["slides"][0]["title"], json!("t"));
    }

    #[tokio::test]
    async fn malformed_model_output_degrades_to_error_slide() {
        let state = state_with_llm(Arc::new(CannedLlm::new("this is not json")));

        let Json(body) = generate_manual(State(state), Json(manual_request()))
            .await
            .expect("generation still succeeds");
        assert_eq!(
            body["data"]["slides"][0]["title"],
            json!("Error Parsing AI Response")
        );
        assert_eq!(
            body["data"]["slides"][0]["content"],
            json!("this is not json")
        );
    }
}
