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

//! Snapshot persistence for the in-memory backend.
//!
//! The record map is serialized with bincode to a temp file and renamed
//! into place, so a crash mid-flush leaves the previous snapshot intact.
//! Load tolerates a missing file (fresh store) but not a corrupt one.

use std::fs;
use std::path::Path;

use timesample_core::{CounterRecord, Result, SampleError};
use tracing::{debug, info};

use crate::memory::MemoryCounterStore;

impl MemoryCounterStore {
    /// Load a store from a snapshot file; a missing file yields an empty
    /// store.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot, starting empty");
                return Ok(MemoryCounterStore::new());
            }
            Err(err) => {
                return Err(SampleError::store_unavailable(format!(
                    "reading snapshot {}: {err}",
                    path.display()
                )))
            }
        };
        let records: Vec<CounterRecord> = bincode::deserialize(&bytes).map_err(|err| {
            SampleError::store_unavailable(format!(
                "decoding snapshot {}: {err}",
                path.display()
            ))
        })?;
        info!(path = %path.display(), records = records.len(), "snapshot loaded");
        Ok(MemoryCounterStore::from_records(records))
    }

    /// Write the current records to `path` atomically.
    pub fn flush(&self, path: &Path) -> Result<()> {
        let records = self.export();
        let bytes = bincode::serialize(&records)
            .map_err(|err| SampleError::store_unavailable(format!("encoding snapshot: {err}")))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|err| {
            SampleError::store_unavailable(format!("writing snapshot {}: {err}", tmp.display()))
        })?;
        fs::rename(&tmp, path).map_err(|err| {
            SampleError::store_unavailable(format!("renaming snapshot {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), records = records.len(), "snapshot flushed");
        Ok(())
    }
}
