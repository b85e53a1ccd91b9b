// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine settings, read from `config/config.json` in the resource directory.

use ember_data::scene::{read_json, AssetError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// File name inside the resource `config/` directory.
pub const CONFIG_FILE: &str = "config.json";

/// Engine settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene loaded at startup, relative to `scenes/`.
    pub startup_scene: String,
    /// Where the editor listens.
    pub editor_address: String,
    /// TCP connection attempts before giving up.
    pub connect_attempts: u32,
    /// Handshake announcements before giving up.
    pub announce_attempts: u32,
    /// Delay between connection attempts and announcements.
    pub retry_interval_ms: u64,
    /// How long to wait for the first scene from the editor.
    pub scene_wait_ms: u64,
    /// Target simulation rate.
    pub frame_rate: u32,
    /// Push a scene snapshot to the editor this often. `None` sends only on request.
    pub sync_interval_secs: Option<f32>,
    /// Liveness ping period.
    pub heartbeat_interval_secs: f32,
    /// Lowest level forwarded to the editor.
    pub remote_log_level: String,
    /// Rewrite the default variant templates at startup.
    pub generate_templates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            startup_scene: "main.scene".to_string(),
            editor_address: "127.0.0.1:5557".to_string(),
            connect_attempts: 30,
            announce_attempts: 30,
            retry_interval_ms: 1000,
            scene_wait_ms: 10_000,
            frame_rate: 60,
            sync_interval_secs: None,
            heartbeat_interval_secs: 1.0,
            remote_log_level: "info".to_string(),
            generate_templates: true,
        }
    }
}

impl EngineConfig {
    /// Reads `path`, or returns the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        if !path.is_file() {
            log::info!("No config at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        let config: Self = read_json(path)?;
        log::info!("Loaded config from {}.", path.display());
        Ok(config)
    }

    /// Seconds per simulated frame.
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    /// Delay between retries.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Parsed forwarding threshold; unrecognised names mean `info`.
    pub fn remote_log_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.remote_log_level).unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info.", self.remote_log_level);
            log::LevelFilter::Info
        })
    }
}
