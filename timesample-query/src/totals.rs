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

//! Range-total reduction.

use std::collections::BTreeMap;

use timesample_core::{CounterRecord, SampleId};

/// Per-identifier counts keyed by sample type.
pub type SampleCounts = BTreeMap<SampleId, BTreeMap<String, u64>>;

/// Sum `entry.total` into `result[id][sample_type]` across all records.
///
/// Records contributing to the same identifier and type (several days in a
/// range) are summed, never overwritten, and the result is independent of
/// record order. Identifiers absent from every record are absent from the
/// result; callers treat absent as zero.
pub fn aggregate_totals(records: &[CounterRecord]) -> SampleCounts {
    let mut counts = SampleCounts::new();
    for record in records {
        for (id, entry) in &record.values {
            *counts
                .entry(id.clone())
                .or_default()
                .entry(record.sample_type.clone())
                .or_insert(0) += entry.total;
        }
    }
    counts
}
