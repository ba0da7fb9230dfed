//! DataShark: web scraping with content analysis.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::ToolApi;

pub struct DataShark;

impl ToolApi for DataShark {
    fn name(&self) -> &'static str {
        "DataShark"
    }

    fn prefix(&self) -> &'static str {
        "/api/tools/datashark"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(describe))
    }
}

async fn describe() -> Json<Value> {
    Json(json!({
        "message": "DataShark AI-Enhanced Web Scraper",
        "version": "2.0.0",
        "description": "Web scraping with business intelligence and content analysis",
        "features": [
            "AI-Enhanced Content Analysis",
            "Business Intelligence Extraction",
            "Technical Assessment",
            "Competitive Analysis",
            "SEO Health Scoring",
            "Price Tracking & Alerts",
            "Content Blueprint Analysis",
            "Advanced Pattern Recognition",
        ],
        "endpoints": {
            "POST": "/api/tools/datashark - Scrape and analyze a website",
        },
        "usage": {
            "method": "POST",
            "body": {
                "url": "string (required)",
                "format": "text | json | csv | xml (optional, default: json)",
                "selectors": "object (optional)",
            },
        },
    }))
}
