use axum::{
	Json, Router,
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use revu_domain::AnalysisType;
use revu_service::{AnalysisStatusSummary, Error, ReprocessOutcome, RunState, RunTicket};

use crate::state::AppState;

pub const HEADER_USER_ID: &str = "x-revu-user-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/products/{product_id}/analyses", post(submit_run).get(analysis_status))
		.route("/v1/products/{product_id}/analyses/{analysis_type}", post(reprocess))
		.route("/v1/runs/{run_id}", get(run_state))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn submit_run(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(product_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RunTicket>), ApiError> {
	let user_id = caller(&headers)?;
	let ticket = state.runs.submit(product_id, user_id).await?;

	Ok((StatusCode::ACCEPTED, Json(ticket)))
}

async fn reprocess(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((product_id, analysis_type)): Path<(Uuid, String)>,
) -> Result<Json<ReprocessOutcome>, ApiError> {
	let user_id = caller(&headers)?;
	let analysis_type = analysis_type.parse::<AnalysisType>().map_err(|err| {
		json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			err.to_string(),
			Some(vec!["$.analysis_type".to_string()]),
		)
	})?;
	let outcome = state.service().reprocess_analysis(product_id, analysis_type, user_id).await?;

	Ok(Json(outcome))
}

async fn analysis_status(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(product_id): Path<Uuid>,
) -> Result<Json<AnalysisStatusSummary>, ApiError> {
	let user_id = caller(&headers)?;
	let summary = state.runs.status(product_id, user_id).await?;

	Ok(Json(summary))
}

async fn run_state(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(run_id): Path<Uuid>,
) -> Result<Json<RunState>, ApiError> {
	let user_id = caller(&headers)?;

	state.runs.run(run_id, user_id).map(Json).ok_or_else(|| {
		json_error(StatusCode::NOT_FOUND, "NOT_FOUND", format!("Run {run_id} is unknown."), None)
	})
}

fn caller(headers: &HeaderMap) -> Result<Uuid, ApiError> {
	headers
		.get(HEADER_USER_ID)
		.and_then(|raw| raw.to_str().ok())
		.and_then(|raw| Uuid::parse_str(raw.trim()).ok())
		.ok_or_else(|| {
			json_error(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				format!("{HEADER_USER_ID} must carry the caller's user id."),
				Some(vec![HEADER_USER_ID.to_string()]),
			)
		})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Unauthorized { message } =>
				json_error(StatusCode::FORBIDDEN, "FORBIDDEN", message, None),
			Error::Conflict { message } =>
				json_error(StatusCode::CONFLICT, "RUN_IN_PROGRESS", message, None),
			Error::InvalidRequest { message } | Error::EmptySelection { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			Error::ExternalService { message } =>
				json_error(StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR", message, None),
			Error::Storage { message } | Error::Qdrant { message } => {
				tracing::error!(error = %message, "Request failed on a storage backend.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Internal error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
