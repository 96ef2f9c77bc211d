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

//! The counter store service.
//!
//! One logical increment writes two records per identifier: the running
//! total (`daystamp == None`) and the current day's record, both keyed by
//! the identifier's creation-day bucket. The write amplification buys O(1)
//! all-time reads. Every backend call is bounded by the configured timeout;
//! expiry surfaces as `StoreUnavailable`, and already-applied increments
//! are not undone.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use timesample_core::{
    day_of, derive_bucket, hour_of, BucketKey, CounterRecord, DayFilter, RecordKey, Result,
    SampleConfig, SampleError, SampleId,
};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::backend::{CounterBackend, IncrementOp, UpsertOutcome};

/// Outcome of a batch increment. `matched`/`created` count touched records
/// (two per identifier); `failed` lists identifiers that did not go through
/// with their causes. Partial application is reported, never rolled back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IncrementReport {
    pub attempted: usize,
    pub matched: u64,
    pub created: u64,
    pub failed: Vec<FailedIncrement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedIncrement {
    pub id: String,
    pub error: String,
}

impl IncrementReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Collapse into the taxonomy error, for callers that treat any failed
    /// identifier as a failure of the whole batch.
    pub fn to_error(&self) -> Option<SampleError> {
        if self.failed.is_empty() {
            return None;
        }
        Some(SampleError::PartialFailure {
            attempted: self.attempted,
            failed: self
                .failed
                .iter()
                .map(|f| (f.id.clone(), f.error.clone()))
                .collect(),
        })
    }
}

pub struct SampleStore<B: CounterBackend> {
    backend: Arc<B>,
    config: SampleConfig,
}

impl<B: CounterBackend> Clone for SampleStore<B> {
    fn clone(&self) -> Self {
        SampleStore {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B: CounterBackend> SampleStore<B> {
    pub fn new(backend: Arc<B>, config: SampleConfig) -> Self {
        SampleStore { backend, config }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Increment `amount` for every identifier under `sample_type`.
    ///
    /// Each identifier produces two upsert-increments (total record and
    /// daily record) targeting the hour slot of the current time in the
    /// configured offset. The batch goes to the backend in one call;
    /// identifiers fail independently and are collected into the report.
    pub async fn increment(
        &self,
        sample_type: &str,
        ids: &[SampleId],
        amount: u64,
    ) -> Result<IncrementReport> {
        if sample_type.is_empty() {
            return Err(SampleError::invalid_argument("sample type is required"));
        }
        if ids.is_empty() {
            return Err(SampleError::invalid_argument("ids must not be empty"));
        }

        let offset = self.config.offset();
        let now = Utc::now();
        let hour = hour_of(now, offset);
        let day = day_of(now, offset);

        let mut ops = Vec::with_capacity(ids.len() * 2);
        for id in ids {
            let bucket = derive_bucket(id, offset);
            ops.push(IncrementOp {
                key: RecordKey::total(sample_type, bucket.clone()),
                id: id.clone(),
                hour,
                amount,
            });
            ops.push(IncrementOp {
                key: RecordKey::daily(sample_type, bucket, day),
                id: id.clone(),
                hour,
                amount,
            });
        }

        let results = timeout(self.config.op_timeout(), self.backend.apply_batch(ops))
            .await
            .map_err(|_| SampleError::store_unavailable("increment batch timed out"))?;
        if results.len() != ids.len() * 2 {
            return Err(SampleError::store_unavailable(
                "backend returned a mismatched batch result",
            ));
        }

        let mut report = IncrementReport {
            attempted: ids.len(),
            ..IncrementReport::default()
        };
        for (i, id) in ids.iter().enumerate() {
            let mut cause = None;
            for result in &results[i * 2..i * 2 + 2] {
                match result {
                    Ok(UpsertOutcome::Matched) => report.matched += 1,
                    Ok(UpsertOutcome::Created) => report.created += 1,
                    Err(err) => cause = Some(err.to_string()),
                }
            }
            if let Some(error) = cause {
                report.failed.push(FailedIncrement {
                    id: id.to_string(),
                    error,
                });
            }
        }
        if report.failed.is_empty() {
            debug!(
                sample_type,
                matched = report.matched,
                created = report.created,
                "increment batch applied"
            );
        } else {
            warn!(
                sample_type,
                failed = report.failed.len(),
                attempted = report.attempted,
                "increment batch partially applied"
            );
        }
        Ok(report)
    }

    /// Raw records for the identifiers' buckets, narrowed by the day
    /// filter. No aggregation happens here. A backend failure or timeout
    /// aborts the whole read.
    pub async fn read_records(
        &self,
        sample_type: &str,
        ids: &[SampleId],
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>> {
        let offset = self.config.offset();
        let mut buckets: Vec<BucketKey> =
            ids.iter().map(|id| derive_bucket(id, offset)).collect();
        buckets.sort();
        buckets.dedup();

        let records = timeout(
            self.config.op_timeout(),
            self.backend.read_buckets(sample_type, &buckets, days),
        )
        .await
        .map_err(|_| SampleError::store_unavailable("record read timed out"))??;
        debug!(sample_type, records = records.len(), "records read");
        Ok(records)
    }

    /// Records of a whole sample type, optionally narrowed to a bucket
    /// range, for ranking.
    pub async fn scan_records(
        &self,
        sample_type: &str,
        bucket_range: Option<(BucketKey, BucketKey)>,
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>> {
        let records = timeout(
            self.config.op_timeout(),
            self.backend.scan_type(sample_type, bucket_range, days),
        )
        .await
        .map_err(|_| SampleError::store_unavailable("type scan timed out"))??;
        debug!(sample_type, records = records.len(), "type scanned");
        Ok(records)
    }
}
