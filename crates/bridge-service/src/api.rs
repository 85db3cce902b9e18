//! Job endpoint.

use axum::{
	body::Bytes,
	extract::State,
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	routing::post,
	Router,
};
use bridge_config::ServerConfig;
use bridge_core::{encoder, SubmissionOrchestrator};
use std::future::Future;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// API server for the job endpoint
pub struct ApiServer {
	config: ServerConfig,
	orchestrator: SubmissionOrchestrator,
}

impl ApiServer {
	pub fn new(config: ServerConfig, orchestrator: SubmissionOrchestrator) -> Self {
		Self {
			config,
			orchestrator,
		}
	}

	/// Serves until `shutdown` resolves. In-flight requests are allowed to finish.
	#[instrument(skip_all)]
	pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let app = router(self.orchestrator);
		let bind_address = self.config.bind_address();
		let listener = tokio::net::TcpListener::bind(&bind_address).await?;

		info!("Job endpoint listening on {}", listener.local_addr()?);

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown)
			.await?;

		Ok(())
	}
}

#[derive(Clone)]
struct AppState {
	orchestrator: SubmissionOrchestrator,
}

/// `POST /` only; other methods on `/` get 405, other paths 404.
pub fn router(orchestrator: SubmissionOrchestrator) -> Router {
	Router::new()
		.route("/", post(handle_job).fallback(method_not_allowed))
		.fallback(not_found)
		.with_state(AppState { orchestrator })
		.layer(TraceLayer::new_for_http())
}

async fn handle_job(State(state): State<AppState>, body: Bytes) -> Response {
	let response = state.orchestrator.process(&body).await;

	match encoder::to_json(&response) {
		Ok(json) => (
			StatusCode::OK,
			[(header::CONTENT_TYPE, "application/json")],
			json,
		)
			.into_response(),
		Err(e) => {
			error!("Failed to encode response for job {:?}: {}", response.job_run_id, e);
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				"500 Internal Server Error.",
			)
				.into_response()
		}
	}
}

async fn not_found() -> (StatusCode, &'static str) {
	(StatusCode::NOT_FOUND, "404 not found.")
}

async fn method_not_allowed() -> Response {
	(
		StatusCode::METHOD_NOT_ALLOWED,
		[(header::ALLOW, "POST")],
		"405 Method not allowed.",
	)
		.into_response()
}
