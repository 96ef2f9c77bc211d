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

//! In-process counter backend.
//!
//! An ordered map keyed by (type, bucket, daystamp) so bucket reads are
//! prefix range scans. The map's write lock serializes record mutation,
//! which stands in for the atomic nested increment a remote store would
//! provide natively; the co-increment of `total` and the hour slot is
//! therefore never observable half-applied.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use timesample_core::{BucketKey, CounterRecord, DayFilter, RecordKey, Result};

use crate::backend::{CounterBackend, IncrementOp, UpsertOutcome};

#[derive(Default)]
pub struct MemoryCounterStore {
    records: RwLock<BTreeMap<RecordKey, CounterRecord>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously exported records.
    pub fn from_records(records: Vec<CounterRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        MemoryCounterStore {
            records: RwLock::new(map),
        }
    }

    /// Clone out every record, e.g. for snapshotting.
    pub fn export(&self) -> Vec<CounterRecord> {
        self.records.read().values().cloned().collect()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    fn upsert_one(&self, op: &IncrementOp) -> UpsertOutcome {
        let now = Utc::now();
        let mut records = self.records.write();
        match records.entry(op.key.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().apply(&op.id, op.hour, op.amount, now);
                UpsertOutcome::Matched
            }
            Entry::Vacant(vacant) => {
                let mut record = CounterRecord::new(&op.key, now);
                record.apply(&op.id, op.hour, op.amount, now);
                vacant.insert(record);
                UpsertOutcome::Created
            }
        }
    }
}

#[async_trait]
impl CounterBackend for MemoryCounterStore {
    async fn apply_batch(&self, ops: Vec<IncrementOp>) -> Vec<Result<UpsertOutcome>> {
        ops.iter().map(|op| Ok(self.upsert_one(op))).collect()
    }

    async fn read_buckets(
        &self,
        sample_type: &str,
        buckets: &[BucketKey],
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>> {
        let records = self.records.read();
        let mut out = Vec::new();
        for bucket in buckets {
            let start = RecordKey::total(sample_type, bucket.clone());
            for (key, record) in records.range(start..) {
                if key.sample_type != sample_type || &key.bucket != bucket {
                    break;
                }
                if days.matches(key.daystamp) {
                    out.push(record.clone());
                }
            }
        }
        Ok(out)
    }

    async fn scan_type(
        &self,
        sample_type: &str,
        bucket_range: Option<(BucketKey, BucketKey)>,
        days: DayFilter,
    ) -> Result<Vec<CounterRecord>> {
        let records = self.records.read();
        let out = records
            .values()
            .filter(|r| r.sample_type == sample_type)
            .filter(|r| match &bucket_range {
                Some((lo, hi)) => r.bucket >= *lo && r.bucket <= *hi,
                None => true,
            })
            .filter(|r| days.matches(r.daystamp))
            .cloned()
            .collect();
        Ok(out)
    }
}
