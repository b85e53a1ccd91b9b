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

use ember_data::scene::{AssetError, SceneError};
use ember_sync::TransportError;
use thiserror::Error;

/// A play-mode transition that could not complete.
#[derive(Debug, Error)]
pub enum PlayModeError {
    /// The edit scene could not be captured.
    #[error("failed to snapshot the edit scene: {0}")]
    Snapshot(#[source] serde_json::Error),
    /// The edit scene could not be restored.
    #[error("failed to restore the edit scene: {0}")]
    Restore(#[from] SceneError),
}

/// Errors surfaced by the engine process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reading or writing resources failed.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// The editor link failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A play-mode transition failed.
    #[error(transparent)]
    PlayMode(#[from] PlayModeError),
    /// The editor never confirmed the handshake.
    #[error("the editor did not confirm the connection")]
    HandshakeFailed,
}
