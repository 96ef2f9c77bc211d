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

//! Counter records.
//!
//! A record aggregates per-identifier counts for one
//! (sample type, bucket, day-or-total) triple. `daystamp == None` marks the
//! running-total record; a concrete day marks that day's record. Records are
//! created lazily on first increment and only ever mutated by increments,
//! never replaced wholesale.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::bucket::BucketKey;
use crate::id::SampleId;

/// Hour slots per daily breakdown.
pub const HOURS_PER_DAY: usize = 24;

/// Per-identifier counter inside a record.
///
/// Invariant: `total == hours.iter().sum()` at all times. Both fields are
/// co-incremented while the owning record is exclusively held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    pub total: u64,
    pub hours: [u64; HOURS_PER_DAY],
}

impl CounterEntry {
    /// Co-increment the lifetime total and the given hour slot.
    /// `hour` must be in 0..24 (it comes from clock truncation upstream).
    pub fn record(&mut self, hour: u32, amount: u64) {
        debug_assert!((hour as usize) < HOURS_PER_DAY);
        self.total += amount;
        self.hours[hour as usize] += amount;
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.hours.iter().sum::<u64>()
    }
}

/// Composite key addressing one stored record.
///
/// The field order gives `Ord` the (type, bucket, daystamp) shape that
/// ordered stores need for prefix range scans; `None` daystamps (the total
/// record) sort before any concrete day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub sample_type: String,
    pub bucket: BucketKey,
    pub daystamp: Option<NaiveDate>,
}

impl RecordKey {
    pub fn total(sample_type: impl Into<String>, bucket: BucketKey) -> Self {
        RecordKey {
            sample_type: sample_type.into(),
            bucket,
            daystamp: None,
        }
    }

    pub fn daily(sample_type: impl Into<String>, bucket: BucketKey, day: NaiveDate) -> Self {
        RecordKey {
            sample_type: sample_type.into(),
            bucket,
            daystamp: Some(day),
        }
    }
}

/// The persisted unit: all per-identifier counters for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub sample_type: String,
    pub bucket: BucketKey,
    pub daystamp: Option<NaiveDate>,
    pub values: BTreeMap<SampleId, CounterEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CounterRecord {
    pub fn new(key: &RecordKey, now: DateTime<Utc>) -> Self {
        CounterRecord {
            sample_type: key.sample_type.clone(),
            bucket: key.bucket.clone(),
            daystamp: key.daystamp,
            values: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            sample_type: self.sample_type.clone(),
            bucket: self.bucket.clone(),
            daystamp: self.daystamp,
        }
    }

    /// Whether this is the running-total record.
    pub fn is_total(&self) -> bool {
        self.daystamp.is_none()
    }

    /// Increment one identifier's counter, creating the entry if absent.
    pub fn apply(&mut self, id: &SampleId, hour: u32, amount: u64, now: DateTime<Utc>) {
        self.values.entry(id.clone()).or_default().record(hour, amount);
        self.updated_at = now;
    }
}

/// Day filter for range reads. The modes are mutually exclusive: `Total`
/// selects only the running-total record, the others select daily records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    Total,
    From(NaiveDate),
    Until(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl DayFilter {
    /// Filter for a caller-supplied optional day range: no bound selects the
    /// total record, any bound selects daily records within it.
    pub fn from_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (None, None) => DayFilter::Total,
            (Some(s), None) => DayFilter::From(s),
            (None, Some(e)) => DayFilter::Until(e),
            (Some(s), Some(e)) => DayFilter::Between(s, e),
        }
    }

    /// Ranking reads narrow to a day span only when both ends are given,
    /// otherwise they rank over the running totals.
    pub fn span_or_total(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) => DayFilter::Between(s, e),
            _ => DayFilter::Total,
        }
    }

    pub fn matches(&self, daystamp: Option<NaiveDate>) -> bool {
        match (self, daystamp) {
            (DayFilter::Total, None) => true,
            (DayFilter::From(s), Some(d)) => d >= *s,
            (DayFilter::Until(e), Some(d)) => d <= *e,
            (DayFilter::Between(s, e), Some(d)) => d >= *s && d <= *e,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn entry_co_increments_total_and_hour() {
        let mut entry = CounterEntry::default();
        entry.record(3, 2);
        entry.record(3, 1);
        entry.record(23, 5);
        assert_eq!(entry.total, 8);
        assert_eq!(entry.hours[3], 3);
        assert_eq!(entry.hours[23], 5);
        assert!(entry.is_consistent());
    }

    #[test]
    fn total_record_sorts_before_daily_records() {
        let bucket = BucketKey::from_date(day(2017, 5, 10));
        let total = RecordKey::total("view", bucket.clone());
        let daily = RecordKey::daily("view", bucket, day(2017, 5, 10));
        assert!(total < daily);
    }

    #[test]
    fn day_filter_modes_are_mutually_exclusive() {
        let d = day(2017, 5, 10);
        assert!(DayFilter::Total.matches(None));
        assert!(!DayFilter::Total.matches(Some(d)));
        assert!(!DayFilter::From(d).matches(None));
        assert!(DayFilter::From(d).matches(Some(d)));
        assert!(!DayFilter::From(d).matches(Some(day(2017, 5, 9))));
        assert!(DayFilter::Until(d).matches(Some(day(2017, 5, 9))));
        assert!(!DayFilter::Until(d).matches(Some(day(2017, 5, 11))));
        let between = DayFilter::Between(day(2017, 5, 9), d);
        assert!(between.matches(Some(day(2017, 5, 9))));
        assert!(between.matches(Some(d)));
        assert!(!between.matches(Some(day(2017, 5, 11))));
        assert!(!between.matches(None));
    }

    #[test]
    fn from_range_picks_the_filter_mode() {
        let d = day(2017, 5, 10);
        assert_eq!(DayFilter::from_range(None, None), DayFilter::Total);
        assert_eq!(DayFilter::from_range(Some(d), None), DayFilter::From(d));
        assert_eq!(DayFilter::from_range(None, Some(d)), DayFilter::Until(d));
        assert_eq!(
            DayFilter::from_range(Some(d), Some(d)),
            DayFilter::Between(d, d)
        );
        assert_eq!(DayFilter::span_or_total(Some(d), None), DayFilter::Total);
    }

    #[test]
    fn record_apply_creates_entries_lazily() {
        let key = RecordKey::total("view", BucketKey::from_date(day(2017, 5, 10)));
        let t0 = DateTime::from_timestamp(1_000, 0).unwrap();
        let t1 = DateTime::from_timestamp(2_000, 0).unwrap();
        let mut record = CounterRecord::new(&key, t0);
        let id = SampleId::generate(t0);

        record.apply(&id, 5, 3, t1);
        assert_eq!(record.values[&id].total, 3);
        assert_eq!(record.created_at, t0);
        assert_eq!(record.updated_at, t1);
        assert!(record.is_total());
    }
}
