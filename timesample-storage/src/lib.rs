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

//! Timesample Storage Layer
//!
//! The bucketed counter store: a backend trait covering the two storage
//! primitives the system needs (atomic nested-increment upsert and filtered
//! record reads), the in-process implementation with snapshot persistence,
//! and the `SampleStore` service that turns logical increments into
//! total + daily record writes.

pub mod backend;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use backend::{CounterBackend, IncrementOp, UpsertOutcome};
pub use memory::MemoryCounterStore;
pub use store::{FailedIncrement, IncrementReport, SampleStore};
