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

//! Top-K reduction.

use std::collections::BTreeMap;

use serde::Serialize;
use timesample_core::{CounterRecord, SampleId};

/// One ranking slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub id: SampleId,
    pub counter: u64,
}

/// The `limit` identifiers with the highest accumulated totals across the
/// supplied records, descending. Callers pre-filter the records to one
/// sample type; the reduction itself does not group by type.
///
/// Equal counters tie-break ascending by identifier, so the ranking is
/// deterministic. `limit == 0` yields an empty ranking; a limit beyond the
/// number of distinct identifiers yields all of them.
pub fn top_k(records: &[CounterRecord], limit: usize) -> Vec<TopEntry> {
    if limit == 0 {
        return Vec::new();
    }

    let mut counters: BTreeMap<&SampleId, u64> = BTreeMap::new();
    for record in records {
        for (id, entry) in &record.values {
            *counters.entry(id).or_insert(0) += entry.total;
        }
    }

    let mut ranked: Vec<TopEntry> = counters
        .into_iter()
        .map(|(id, counter)| TopEntry {
            id: id.clone(),
            counter,
        })
        .collect();
    ranked.sort_by(|a, b| b.counter.cmp(&a.counter).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}
