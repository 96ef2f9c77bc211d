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

//! The query engine: entry-point semantics over the counter store.
//!
//! Validation happens here, before anything touches storage: a missing
//! sample type or id set is `InvalidArgument`; an unparseable identifier on
//! a read is `InvalidIdentifier` and aborts the call. On writes,
//! unparseable identifiers fail individually inside the batch report
//! instead, so one bad id cannot block the rest.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use timesample_core::{BucketKey, DayFilter, Result, SampleError, SampleId};
use timesample_storage::{CounterBackend, FailedIncrement, IncrementReport, SampleStore};
use tracing::debug;

use crate::ranking::{top_k, TopEntry};
use crate::totals::{aggregate_totals, SampleCounts};

/// Identifier list input: a JSON array, or a single comma-separated string
/// which is split and trimmed before use.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    One(String),
    Many(Vec<String>),
}

impl IdList {
    pub fn normalize(&self) -> Vec<String> {
        match self {
            IdList::One(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            IdList::Many(ids) => ids.clone(),
        }
    }
}

impl From<&str> for IdList {
    fn from(joined: &str) -> Self {
        IdList::One(joined.to_string())
    }
}

impl From<Vec<String>> for IdList {
    fn from(ids: Vec<String>) -> Self {
        IdList::Many(ids)
    }
}

pub struct SampleQuery<B: CounterBackend> {
    store: SampleStore<B>,
}

impl<B: CounterBackend> SampleQuery<B> {
    pub fn new(store: SampleStore<B>) -> Self {
        SampleQuery { store }
    }

    pub fn store(&self) -> &SampleStore<B> {
        &self.store
    }

    /// Write entry point: increment `amount` (default 1 at the API edge)
    /// for every identifier under `sample_type`.
    ///
    /// Identifiers that fail to parse are reported in the batch result
    /// alongside storage failures; valid identifiers still go through.
    pub async fn increment_counts(
        &self,
        sample_type: &str,
        ids: &IdList,
        amount: u64,
    ) -> Result<IncrementReport> {
        let raw = ids.normalize();
        validate_inputs(sample_type, &raw)?;

        let mut parsed = Vec::with_capacity(raw.len());
        let mut unparseable = Vec::new();
        for raw_id in &raw {
            match SampleId::parse(raw_id) {
                Ok(id) => parsed.push(id),
                Err(err) => unparseable.push(FailedIncrement {
                    id: raw_id.clone(),
                    error: err.to_string(),
                }),
            }
        }

        let mut report = if parsed.is_empty() {
            IncrementReport::default()
        } else {
            self.store.increment(sample_type, &parsed, amount).await?
        };
        report.attempted = raw.len();
        report.failed.extend(unparseable);
        debug!(
            sample_type,
            attempted = report.attempted,
            matched = report.matched,
            created = report.created,
            failed = report.failed.len(),
            "increment counts"
        );
        Ok(report)
    }

    /// Range query entry point: per-identifier totals keyed by sample type.
    ///
    /// Without a day range this reads the running-total records; with one
    /// it sums the matching day records.
    pub async fn sample_counts(
        &self,
        sample_type: &str,
        ids: &IdList,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SampleCounts> {
        let raw = ids.normalize();
        validate_inputs(sample_type, &raw)?;
        let parsed = parse_all(&raw)?;

        let records = self
            .store
            .read_records(sample_type, &parsed, DayFilter::from_range(start, end))
            .await?;
        let counts = aggregate_totals(&records);
        debug!(sample_type, ids = raw.len(), "sample counts aggregated");
        Ok(counts)
    }

    /// Counts for a single identifier; an identifier with nothing recorded
    /// yields an empty map.
    pub async fn sample_count(
        &self,
        sample_type: &str,
        id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BTreeMap<String, u64>> {
        if id.trim().is_empty() {
            return Err(SampleError::invalid_argument("id is required"));
        }
        let mut counts = self
            .sample_counts(sample_type, &IdList::Many(vec![id.to_string()]), start, end)
            .await?;
        let parsed = SampleId::parse(id)?;
        Ok(counts.remove(&parsed).unwrap_or_default())
    }

    /// Top-K entry point: the highest-counting identifiers of one sample
    /// type. The bucket scope narrows only when both ends are given, and
    /// the ranking covers a day span only when both dates are given,
    /// otherwise the running totals.
    pub async fn top_counts(
        &self,
        sample_type: &str,
        limit: usize,
        bucket_start: Option<NaiveDate>,
        bucket_end: Option<NaiveDate>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TopEntry>> {
        if sample_type.is_empty() {
            return Err(SampleError::invalid_argument("sample type is required"));
        }

        let bucket_range = match (bucket_start, bucket_end) {
            (Some(lo), Some(hi)) => Some((BucketKey::from_date(lo), BucketKey::from_date(hi))),
            _ => None,
        };
        let records = self
            .store
            .scan_records(sample_type, bucket_range, DayFilter::span_or_total(start, end))
            .await?;
        let ranked = top_k(&records, limit);
        debug!(sample_type, limit, ranked = ranked.len(), "top counts");
        Ok(ranked)
    }
}

fn validate_inputs(sample_type: &str, ids: &[String]) -> Result<()> {
    if sample_type.is_empty() {
        return Err(SampleError::invalid_argument("sample type is required"));
    }
    if ids.is_empty() {
        return Err(SampleError::invalid_argument("ids must not be empty"));
    }
    Ok(())
}

fn parse_all(raw: &[String]) -> Result<Vec<SampleId>> {
    raw.iter().map(|r| SampleId::parse(r)).collect()
}
