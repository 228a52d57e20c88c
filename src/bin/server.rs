use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use polypack::solver;
use polypack::types::{Demand, RegionSpec, ShapeCatalog, ShapeMask, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

// Requests cannot hang on a pathological region; clients may lower the
// budget but get Unknown verdicts in exchange.
const DEFAULT_MAX_NODES: u64 = 10_000_000;

#[derive(Deserialize, Serialize)]
struct SolveRequest {
    /// Shape id (as a string key) -> rows of '#'/'.' characters.
    shapes: HashMap<String, Vec<String>>,
    regions: Vec<RegionRequest>,
    #[serde(default = "default_max_nodes")]
    max_nodes: u64,
}

#[derive(Deserialize, Serialize)]
struct RegionRequest {
    width: i64,
    height: i64,
    /// Positional: counts[i] is the required quantity of shape id i.
    counts: Vec<u64>,
}

fn default_max_nodes() -> u64 {
    DEFAULT_MAX_NODES
}

#[derive(Serialize)]
struct SolveResponse {
    solvable: usize,
    regions: usize,
    verdicts: Vec<Verdict>,
}

async fn solve(
    Json(req): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /solve"
    );

    let mut catalog = ShapeCatalog::new();
    for (key, rows) in &req.shapes {
        let id = key
            .parse::<usize>()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid shape id '{}'", key)))?;
        let mask = ShapeMask::from_rows(rows)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("shape {}: {}", id, e)))?;
        catalog.insert(id, mask);
    }

    let regions: Vec<RegionSpec> = req
        .regions
        .iter()
        .map(|r| RegionSpec {
            width: r.width,
            height: r.height,
            demands: r
                .counts
                .iter()
                .enumerate()
                .map(|(shape, &qty)| Demand { shape, qty })
                .collect(),
        })
        .collect();

    let verdicts: Vec<Verdict> = regions
        .iter()
        .map(|r| solver::evaluate_region_bounded(r, &catalog, Some(req.max_nodes)))
        .collect();

    let response = SolveResponse {
        solvable: verdicts.iter().filter(|&&v| v == Verdict::Solvable).count(),
        regions: regions.len(),
        verdicts,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/solve", post(solve))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
