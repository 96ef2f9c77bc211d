// Copyright 2025 Timesample Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

pub mod health;
pub mod samples;

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use timesample_core::SampleError;
use timesample_query::SampleQuery;
use timesample_storage::MemoryCounterStore;
use tower_http::trace::TraceLayer;

pub use health::health_check;
pub use samples::{
    get_sample, increment_samples, query_samples, query_top, reject_replace, IncrementRequest,
    IncrementResponse, SampleQueryParams, TopQueryParams,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<SampleQuery<MemoryCounterStore>>,
    pub backend: Arc<MemoryCounterStore>,
    pub started_at: Instant,
}

/// API error carrying the core taxonomy to an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub SampleError);

impl From<SampleError> for ApiError {
    fn from(err: SampleError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SampleError::InvalidArgument(_) | SampleError::InvalidIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            SampleError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SampleError::PartialFailure { .. } => StatusCode::MULTI_STATUS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_check))
        .route(
            "/api/v1/samples",
            post(increment_samples)
                .get(query_samples)
                .put(reject_replace)
                .patch(reject_replace),
        )
        .route("/api/v1/samples/top", get(query_top))
        .route("/api/v1/samples/:id", get(get_sample))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
