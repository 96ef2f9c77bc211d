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

//! Association adapter: join counts onto host records.
//!
//! Host record lists arrive as JSON documents. Each must expose a non-empty
//! string `id`; the adapter aggregates counts for the distinct ids in one
//! read and writes each record's count (or `0`) into the target field.
//! Order and all other fields are preserved.

use serde_json::Value;
use timesample_core::{Result, SampleError, SampleId};
use timesample_storage::CounterBackend;
use tracing::debug;

use crate::engine::{IdList, SampleQuery};

impl<B: CounterBackend> SampleQuery<B> {
    /// Populate `target_field` on every record with its aggregated count
    /// for `sample_type` over the optional day range.
    pub async fn assoc_counts(
        &self,
        records: &mut [Value],
        sample_type: &str,
        target_field: &str,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> Result<()> {
        if target_field.is_empty() {
            return Err(SampleError::invalid_argument("target field is required"));
        }
        if records.is_empty() {
            return Ok(());
        }

        let mut ids = Vec::with_capacity(records.len());
        for record in records.iter() {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    SampleError::invalid_argument("every record must expose a non-empty id")
                })?;
            ids.push(id.to_string());
        }

        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();

        let counts = self
            .sample_counts(sample_type, &IdList::Many(distinct), start, end)
            .await?;

        for (record, id) in records.iter_mut().zip(&ids) {
            // validated above, so the parse cannot fail here
            let count = SampleId::parse(id)
                .ok()
                .and_then(|sid| counts.get(&sid).and_then(|c| c.get(sample_type)).copied())
                .unwrap_or(0);
            record[target_field] = Value::from(count);
        }
        debug!(
            sample_type,
            records = records.len(),
            target_field,
            "counts associated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;
    use std::sync::Arc;
    use timesample_core::SampleConfig;
    use timesample_storage::{MemoryCounterStore, SampleStore};

    fn engine() -> SampleQuery<MemoryCounterStore> {
        SampleQuery::new(SampleStore::new(
            Arc::new(MemoryCounterStore::new()),
            SampleConfig::utc(),
        ))
    }

    fn id(tag: u8) -> SampleId {
        SampleId::from_parts(DateTime::from_timestamp(1_494_547_200, 0).unwrap(), [tag; 8])
    }

    #[tokio::test]
    async fn fills_counts_and_zero_for_unseen_ids() {
        let engine = engine();
        engine
            .increment_counts("view", &IdList::Many(vec![id(1).to_string()]), 3)
            .await
            .unwrap();

        let mut records = vec![
            json!({"id": id(1).to_string(), "title": "first"}),
            json!({"id": id(2).to_string(), "title": "second"}),
        ];
        engine
            .assoc_counts(&mut records, "view", "views", None, None)
            .await
            .unwrap();

        assert_eq!(records[0]["views"], 3);
        assert_eq!(records[0]["title"], "first");
        assert_eq!(records[1]["views"], 0);
    }

    #[tokio::test]
    async fn empty_input_is_returned_unchanged() {
        let engine = engine();
        let mut records: Vec<Value> = Vec::new();
        engine
            .assoc_counts(&mut records, "view", "views", None, None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn record_without_id_is_invalid() {
        let engine = engine();
        for bad in [json!({"title": "no id"}), json!({"id": ""}), json!(42)] {
            let mut records = vec![bad];
            assert!(matches!(
                engine
                    .assoc_counts(&mut records, "view", "views", None, None)
                    .await,
                Err(SampleError::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn duplicate_ids_each_get_the_count() {
        let engine = engine();
        engine
            .increment_counts("view", &IdList::Many(vec![id(1).to_string()]), 2)
            .await
            .unwrap();

        let mut records = vec![
            json!({"id": id(1).to_string()}),
            json!({"id": id(1).to_string()}),
        ];
        engine
            .assoc_counts(&mut records, "view", "views", None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["views"], 2);
        assert_eq!(records[1]["views"], 2);
    }

    #[tokio::test]
    async fn existing_target_field_is_overwritten() {
        let engine = engine();
        engine
            .increment_counts("view", &IdList::Many(vec![id(1).to_string()]), 1)
            .await
            .unwrap();

        let mut records = vec![json!({"id": id(1).to_string(), "views": "stale"})];
        engine
            .assoc_counts(&mut records, "view", "views", None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["views"], 1);
    }
}
