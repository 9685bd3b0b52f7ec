use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::{JobParameters, Phase, PollOutcome, TaskCompleteRequest, TaskCompleteResponse};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/parameters", get(get_parameters).fallback(not_found))
        .route(
            "/map",
            get(poll_map_task).post(complete_map_task).fallback(not_found),
        )
        .route(
            "/reduce",
            get(poll_reduce_task)
                .post(complete_reduce_task)
                .fallback(not_found),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Endpoint not found.\n")
}

async fn get_parameters(State(state): State<AppState>) -> Json<JobParameters> {
    Json(state.parameters())
}

/// 200 con la tarea, 300 si la fase se agotó, 303 si la barrera no se cumple.
fn poll_response(phase: Phase, outcome: PollOutcome) -> Response {
    match outcome {
        PollOutcome::Assigned(assignment) => (StatusCode::OK, Json(assignment)).into_response(),
        PollOutcome::Exhausted => (
            StatusCode::MULTIPLE_CHOICES,
            format!("All tasks are distributed for {}\n", phase),
        )
            .into_response(),
        PollOutcome::PhaseNotReady => (
            StatusCode::SEE_OTHER,
            "Map tasks are not yet completed\n",
        )
            .into_response(),
    }
}

async fn poll_map_task(State(state): State<AppState>) -> Response {
    poll_response(Phase::Map, state.poll_map())
}

async fn poll_reduce_task(State(state): State<AppState>) -> Response {
    poll_response(Phase::Reduce, state.poll_reduce())
}

async fn complete_map_task(
    State(state): State<AppState>,
    Json(req): Json<TaskCompleteRequest>,
) -> Json<TaskCompleteResponse> {
    state.report_map_complete(req.task_id);
    Json(TaskCompleteResponse { ok: true })
}

async fn complete_reduce_task(
    State(state): State<AppState>,
    Json(req): Json<TaskCompleteRequest>,
) -> Json<TaskCompleteResponse> {
    state.report_reduce_complete(req.task_id);
    Json(TaskCompleteResponse { ok: true })
}
