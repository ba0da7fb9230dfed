//! VizFin: chart generation from uploaded data files, plus natural
//! language questions about the resulting charts.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::ToolApi;

pub struct VizFin;

impl ToolApi for VizFin {
    fn name(&self) -> &'static str {
        "VizFin"
    }

    fn prefix(&self) -> &'static str {
        "/api/tools/vizfin"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(describe))
            .route("/query", get(describe_query))
    }
}

async fn describe() -> Json<Value> {
    Json(json!({
        "message": "VizFin API - Upload data files to create visualizations",
        "supportedFormats": ["CSV", "JSON"],
        "chartTypes": ["bar", "line", "area", "pie", "scatter"],
    }))
}

async fn describe_query() -> Json<Value> {
    Json(json!({
        "message": "VizFin Query API - Ask natural language questions about your chart data",
        "usage": "POST with query, chartData, and metadata",
        "features": [
            "Natural language querying",
            "Data pattern analysis",
            "Trend identification",
            "Statistical insights",
        ],
    }))
}
