//! HTTP compile server — exposes the five-pass pipeline over a small REST
//! surface so a remote caller can compile a named scenario without linking
//! `catseq-core` directly.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use catseq_core::{CompileOptions, CostTable, Cycles, NullOracle, OpCode, TableOracle, compile, demo};

/// Shared server state. A calibrated cost table is built once at startup
/// rather than per request, mirroring how a real ISA cost table is loaded
/// from a calibration file once and reused.
struct AppState {
    calibrated: bool,
    table_oracle: TableOracle,
}

#[derive(Deserialize)]
struct CompileParams {
    scenario: String,
    /// Skip Pass 3 pipelining.
    no_pipelining: Option<bool>,
}

#[derive(Serialize)]
struct CompileResponse {
    scenario: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    boards: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    calibrated: bool,
}

#[derive(Serialize)]
struct ScenariosResponse {
    scenarios: Vec<&'static str>,
}

trait JsonWithStatus<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>);
}

impl<T> JsonWithStatus<T> for Json<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>) {
        (status, self)
    }
}

async fn handle_compile(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompileParams>,
) -> (StatusCode, Json<CompileResponse>) {
    let morphism = match demo::build(&params.scenario) {
        Ok(m) => m,
        Err(err) => {
            log::warn!("compile request for unknown scenario '{}': {err}", params.scenario);
            return Json(CompileResponse {
                scenario: params.scenario,
                success: false,
                boards: None,
                error: Some(err),
            })
            .with_status(StatusCode::BAD_REQUEST);
        }
    };

    let options = if params.no_pipelining.unwrap_or(false) {
        CompileOptions::fast()
    } else {
        CompileOptions::default()
    };

    let null_oracle = NullOracle;
    let oracle: &dyn catseq_core::CostOracle = if state.calibrated {
        &state.table_oracle
    } else {
        &null_oracle
    };

    match compile(&morphism, oracle, &options) {
        Ok(plan) => {
            let mut boards = serde_json::Map::new();
            for (board, instructions) in &plan {
                let list: Vec<_> = instructions.iter().map(|i| i.to_json()).collect();
                boards.insert(board.name(), serde_json::Value::Array(list));
            }
            log::info!("compiled scenario '{}' into {} board stream(s)", params.scenario, plan.len());
            (
                StatusCode::OK,
                Json(CompileResponse {
                    scenario: params.scenario,
                    success: true,
                    boards: Some(serde_json::Value::Object(boards)),
                    error: None,
                }),
            )
        }
        Err(err) => {
            log::error!("compile failed for scenario '{}': {err}", params.scenario);
            Json(CompileResponse {
                scenario: params.scenario,
                success: false,
                boards: None,
                error: Some(err.to_string()),
            })
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

async fn handle_scenarios() -> Json<ScenariosResponse> {
    Json(ScenariosResponse {
        scenarios: demo::names().to_vec(),
    })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        calibrated: state.calibrated,
    })
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "catseq compile server",
        "version": catseq_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/scenarios": "List built-in demonstration scenarios",
            "/compile": {
                "method": "GET",
                "params": {
                    "scenario": "Scenario name, see /scenarios",
                    "no_pipelining": "Skip Pass 3 pipelining (true/false, default false)",
                }
            },
            "/health": "Health check",
        }
    }))
}

fn default_cost_table() -> CostTable {
    let mut table = CostTable::with_default(Cycles(50));
    table.set(OpCode::WfLoadCoeffs, Cycles(2_000));
    table.set(OpCode::TtlInit, Cycles(10));
    table.set(OpCode::WfInit, Cycles(100));
    table
}

/// Build the axum router.
fn build_router(calibrated: bool) -> Router {
    let state = Arc::new(AppState {
        calibrated,
        table_oracle: TableOracle::new(default_cost_table()),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/scenarios", get(handle_scenarios))
        .route("/compile", get(handle_compile))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP compile server.
pub async fn run_server(host: &str, port: u16, calibrated: bool) {
    let app = build_router(calibrated);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    log::info!("catseq-server listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
