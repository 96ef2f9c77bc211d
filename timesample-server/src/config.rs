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

//! Server configuration: optional TOML file layered under `TIMESAMPLE_*`
//! environment overrides (`TIMESAMPLE_LISTEN`, `TIMESAMPLE_SAMPLE__UTC_OFFSET_MINUTES`, ...).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use timesample_core::SampleConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for the HTTP API.
    pub listen: String,

    /// Directory holding the counter snapshot.
    pub data_dir: PathBuf,

    /// Core counting behavior (bucket offset, storage timeout).
    pub sample: SampleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: "127.0.0.1:8710".to_string(),
            data_dir: PathBuf::from("./data"),
            sample: SampleConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("TIMESAMPLE").separator("__"),
        );
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("counters.bin")
    }
}
