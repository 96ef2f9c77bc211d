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

use std::sync::Arc;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use timesample_core::{DayFilter, SampleConfig, SampleId};
use timesample_storage::{MemoryCounterStore, SampleStore};

fn bench_increment(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = SampleStore::new(Arc::new(MemoryCounterStore::new()), SampleConfig::utc());
    let ids: Vec<SampleId> = (0..100).map(|_| SampleId::generate(Utc::now())).collect();

    c.bench_function("increment_100_ids", |b| {
        b.iter(|| {
            rt.block_on(store.increment("view", &ids, 1)).unwrap();
        })
    });
}

fn bench_read(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = SampleStore::new(Arc::new(MemoryCounterStore::new()), SampleConfig::utc());
    let ids: Vec<SampleId> = (0..100).map(|_| SampleId::generate(Utc::now())).collect();
    rt.block_on(store.increment("view", &ids, 1)).unwrap();

    c.bench_function("read_total_records_100_ids", |b| {
        b.iter(|| {
            rt.block_on(store.read_records("view", &ids, DayFilter::Total))
                .unwrap();
        })
    });
}

criterion_group!(benches, bench_increment, bench_read);
criterion_main!(benches);
