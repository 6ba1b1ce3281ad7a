//! `relevance` command-line entrypoint.
//!
//! Reads an analysis request as JSON (from the file given as the first argument, or stdin) and
//! prints the relevance report as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! relevance [REQUEST.json]
//! relevance --warm-up
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use serde::{Deserialize, Serialize};

use relevance::config::Config;
use relevance::embedding::{BertEmbedderConfig, EmbedderFactory, StubEmbedder};
use relevance::gateway::{EmbedderGateway, GatewayConfig};
use relevance::{AnalysisOutcome, ContentChunk, PageContent, RelevanceAnalyzer, RelevanceReport};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_CALLER_ID: &str = "default";

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    #[serde(default)]
    queries: Vec<String>,
    #[serde(default)]
    chunks: Vec<ContentChunk>,
    #[serde(default)]
    page: Option<PageContent>,
    #[serde(default = "default_caller_id")]
    caller_id: String,
}

fn default_caller_id() -> String {
    DEFAULT_CALLER_ID.to_string()
}

#[derive(Debug, Serialize)]
struct AnalysisResponse<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    report: &'a RelevanceReport,
}

impl<'a> AnalysisResponse<'a> {
    fn from_outcome(outcome: &'a AnalysisOutcome) -> Self {
        Self {
            status: if outcome.is_degraded() {
                "degraded"
            } else {
                "complete"
            },
            message: outcome.status_message(),
            report: outcome.report(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let factory = build_factory(&config);
    let gateway = Arc::new(EmbedderGateway::new(factory, GatewayConfig::from(&config)));

    tracing::info!(
        model = %gateway.model_name(),
        max_calls = config.max_calls_per_window,
        window_secs = config.window_secs,
        cache_capacity = config.cache_capacity,
        workers = config.worker_pool_size,
        "Relevance engine starting"
    );

    let mut args = std::env::args().skip(1);
    let input = match args.next() {
        Some(flag) if flag == "--warm-up" => std::process::exit(run_warm_up(&gateway).await),
        Some(path) => Some(PathBuf::from(path)),
        None => None,
    };

    let request = read_request(input)?;
    let analyzer = RelevanceAnalyzer::new(gateway);

    let outcome = match &request.page {
        Some(page) => {
            if !request.chunks.is_empty() {
                tracing::warn!(
                    chunks = request.chunks.len(),
                    "Request has both page and chunks, ignoring chunks"
                );
            }
            analyzer
                .analyze_page(page, &request.queries, &request.caller_id)
                .await
        }
        None => {
            analyzer
                .analyze(&request.queries, &request.chunks, &request.caller_id)
                .await
        }
    };

    let response = AnalysisResponse::from_outcome(&outcome);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn build_factory(config: &Config) -> Arc<dyn EmbedderFactory> {
    match &config.model_path {
        Some(path) => {
            Arc::new(BertEmbedderConfig::new(path.clone()).with_device(config.device))
        }
        None => {
            tracing::warn!("No RELEVANCE_MODEL_PATH configured, running embedder in stub mode");
            Arc::new(StubEmbedder::new())
        }
    }
}

async fn run_warm_up(gateway: &EmbedderGateway) -> i32 {
    match gateway.warm_up().await {
        Ok(()) => {
            tracing::info!(model = %gateway.model_name(), "Embedder warm");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "Embedder warm-up failed");
            1
        }
    }
}

fn read_request(path: Option<PathBuf>) -> anyhow::Result<AnalysisRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read request from {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read request from stdin")?;
            raw
        }
    };
    parse_request(&raw)
}

fn parse_request(raw: &str) -> anyhow::Result<AnalysisRequest> {
    serde_json::from_str(raw).context("request is not a valid analysis request")
}
