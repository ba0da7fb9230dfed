//! QueryHammerhead: LLM-backed query processing.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use super::ToolApi;

const MODES: [&str; 5] = ["analysis", "research", "code", "creative", "optimization"];

const MODELS: [&str; 9] = [
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "gemma2-9b-it",
    "llama3-70b-8192",
    "llama3-8b-8192",
    "deepseek-r1-distill-llama-70b",
    "qwen/qwen3-32b",
    "qwen-qwq-32b",
    "mistral-saba-24b",
];

pub struct QueryHammerhead;

impl ToolApi for QueryHammerhead {
    fn name(&self) -> &'static str {
        "QueryHammerhead"
    }

    fn prefix(&self) -> &'static str {
        "/api/tools/queryhammerhead"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(describe))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Descriptor {
    name: &'static str,
    description: &'static str,
    version: &'static str,
    provider: &'static str,
    modes: &'static [&'static str],
    available_models: &'static [&'static str],
    default_model: &'static str,
}

async fn describe() -> Json<Descriptor> {
    Json(Descriptor {
        name: "QueryHammerhead",
        description: "Advanced AI-powered query processing tool using Groq",
        version: "1.0.0",
        provider: "Groq",
        modes: &MODES,
        available_models: &MODELS,
        default_model: MODELS[0],
    })
}
