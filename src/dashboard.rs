use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Demo-mode data for the dashboard views; these endpoints are canned until
/// the CRM integration lands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/crm/clients", get(crm_clients))
        .route("/api/dashboard/stats", get(dashboard_stats))
}

async fn crm_clients() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "Tech Corp", "status": "Potential", "last_contact": "2024-02-01" },
        { "id": 2, "name": "Finance Ltd", "status": "Signed", "last_contact": "2024-01-28" },
        { "id": 3, "name": "Retail Inc", "status": "Negotiating", "last_contact": "2024-02-03" },
    ]))
}

async fn dashboard_stats() -> Json<Value> {
    Json(json!({
        "total_projects": 128,
        "active_clients": 45,
        "conversion_rate": "12.5%",
        "revenue": "¥1,250,000",
    }))
}
