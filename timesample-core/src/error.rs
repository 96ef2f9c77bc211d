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

//! Error taxonomy for sample counting.
//!
//! `InvalidArgument` and `InvalidIdentifier` are rejected at the entry
//! point before any write is attempted. `StoreUnavailable` on a read aborts
//! the whole call; on a write batch it is reported per identifier instead.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SampleError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// Missing or malformed required input: absent sample type, absent ids,
    /// or a host record lacking an `id` field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The identifier does not encode a parseable creation timestamp.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A storage call failed or timed out.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A batch increment in which some identifiers failed. Retrying the
    /// failed subset is the caller's concern; replaying succeeded
    /// identifiers double-counts.
    #[error("partial failure: {} of {attempted} identifiers failed", failed.len())]
    PartialFailure {
        /// Number of identifiers submitted in the batch.
        attempted: usize,
        /// Failed identifiers with their causes, in submission order.
        failed: Vec<(String, String)>,
    },
}

impl SampleError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SampleError::InvalidArgument(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        SampleError::StoreUnavailable(msg.into())
    }
}
