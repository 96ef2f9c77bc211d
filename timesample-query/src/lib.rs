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

//! Timesample Query Engine
//!
//! Reductions over counter records (range totals, top-K), the association
//! adapter for host record lists, and the entry-point engine the server
//! boundary calls into.

pub mod assoc;
pub mod engine;
pub mod ranking;
pub mod totals;

pub use engine::{IdList, SampleQuery};
pub use ranking::{top_k, TopEntry};
pub use totals::{aggregate_totals, SampleCounts};
