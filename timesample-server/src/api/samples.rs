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

//! Sample counter endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use timesample_core::SampleError;
use timesample_query::{IdList, SampleCounts, TopEntry};
use timesample_storage::FailedIncrement;
use tracing::warn;

use super::{ApiError, AppState};

/// Request to increment counters for a set of identifiers.
#[derive(Debug, Deserialize)]
pub struct IncrementRequest {
    #[serde(rename = "type")]
    pub sample_type: String,
    pub ids: IdList,
    /// Increment amount, default 1.
    pub count: Option<u64>,
}

/// Result of an increment batch. `failed` is present only when some
/// identifiers did not go through; retrying those is the caller's call.
#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub matched: u64,
    pub created: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedIncrement>,
}

/// Query parameters for range-count reads.
#[derive(Debug, Deserialize)]
pub struct SampleQueryParams {
    #[serde(rename = "type")]
    pub sample_type: String,
    /// Comma-separated identifier list.
    pub ids: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Query parameters for the top-K ranking.
#[derive(Debug, Deserialize)]
pub struct TopQueryParams {
    #[serde(rename = "type")]
    pub sample_type: String,
    pub limit: i64,
    pub bucket_start: Option<NaiveDate>,
    pub bucket_end: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// POST /api/v1/samples - increment counters for a set of identifiers
pub async fn increment_samples(
    State(state): State<AppState>,
    Json(req): Json<IncrementRequest>,
) -> Result<Json<IncrementResponse>, ApiError> {
    let report = state
        .query
        .increment_counts(&req.sample_type, &req.ids, req.count.unwrap_or(1))
        .await?;
    if !report.is_complete() {
        warn!(
            sample_type = %req.sample_type,
            failed = report.failed.len(),
            "increment request partially applied"
        );
    }
    Ok(Json(IncrementResponse {
        matched: report.matched,
        created: report.created,
        failed: report.failed,
    }))
}

/// GET /api/v1/samples - per-identifier counts for a day range
pub async fn query_samples(
    State(state): State<AppState>,
    Query(params): Query<SampleQueryParams>,
) -> Result<Json<SampleCounts>, ApiError> {
    let ids = params
        .ids
        .ok_or_else(|| SampleError::invalid_argument("ids is required"))?;
    let counts = state
        .query
        .sample_counts(
            &params.sample_type,
            &IdList::One(ids),
            params.start,
            params.end,
        )
        .await?;
    Ok(Json(counts))
}

/// GET /api/v1/samples/:id - counts for one identifier
pub async fn get_sample(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SampleQueryParams>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    let counts = state
        .query
        .sample_count(&params.sample_type, &id, params.start, params.end)
        .await?;
    Ok(Json(counts))
}

/// GET /api/v1/samples/top - highest-counting identifiers of a sample type
pub async fn query_top(
    State(state): State<AppState>,
    Query(params): Query<TopQueryParams>,
) -> Result<Json<Vec<TopEntry>>, ApiError> {
    let limit = usize::try_from(params.limit).unwrap_or(0);
    let top = state
        .query
        .top_counts(
            &params.sample_type,
            limit,
            params.bucket_start,
            params.bucket_end,
            params.start,
            params.end,
        )
        .await?;
    Ok(Json(top))
}

/// PUT/PATCH /api/v1/samples - counters are increment-only
pub async fn reject_replace() -> ApiError {
    ApiError(SampleError::invalid_argument(
        "counters are increment-only; whole-record updates are not allowed",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{router, AppState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::time::Instant;
    use timesample_core::{SampleConfig, SampleId};
    use timesample_query::SampleQuery;
    use timesample_storage::{MemoryCounterStore, SampleStore};
    use tower::ServiceExt;

    fn app() -> (axum::Router, Vec<String>) {
        let backend = Arc::new(MemoryCounterStore::new());
        let store = SampleStore::new(backend.clone(), SampleConfig::utc());
        let state = AppState {
            query: Arc::new(SampleQuery::new(store)),
            backend,
            started_at: Instant::now(),
        };
        let ids = (1..=2u8)
            .map(|tag| SampleId::from_parts(Utc::now(), [tag; 8]).to_string())
            .collect();
        (router(state), ids)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn increment_then_query_round_trips() {
        let (app, ids) = app();

        for _ in 0..2 {
            let request = Request::builder()
                .method("POST")
                .uri("/api/v1/samples")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"type": "view", "ids": ids}).to_string(),
                ))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let uri = format!("/api/v1/samples?type=view&ids={}", ids.join(","));
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let counts = body_json(response).await;
        assert_eq!(counts[&ids[0]]["view"], 2);
        assert_eq!(counts[&ids[1]]["view"], 2);
    }

    #[tokio::test]
    async fn missing_ids_is_a_bad_request() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/samples?type=view")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("ids"));
    }

    #[tokio::test]
    async fn top_endpoint_ranks_by_counter() {
        let (app, ids) = app();

        for (amount, id) in [(5, &ids[0]), (3, &ids[1])] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/v1/samples")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"type": "click", "ids": [id], "count": amount}).to_string(),
                ))
                .unwrap();
            app.clone().oneshot(request).await.unwrap();
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/samples/top?type=click&limit=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let top = body_json(response).await;
        assert_eq!(top[0]["id"], ids[0].as_str());
        assert_eq!(top[0]["counter"], 5);
    }

    #[tokio::test]
    async fn replace_is_rejected() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/samples")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn single_id_endpoint_returns_counts() {
        let (app, ids) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/samples")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"type": "view", "ids": [ids[0]]}).to_string(),
            ))
            .unwrap();
        app.clone().oneshot(request).await.unwrap();

        let uri = format!("/api/v1/samples/{}?type=view", ids[0]);
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let counts = body_json(response).await;
        assert_eq!(counts["view"], 1);
    }
}
