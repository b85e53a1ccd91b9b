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

use ember_core::reflect::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// A variant that could not be turned into or built from JSON.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The type is unknown or cannot be constructed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The instance is checked out by a running hook.
    #[error("variant '{0}' is busy in a running hook")]
    CheckedOut(&'static str),
}

/// A scene document that cannot be loaded at all.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The text is not a well-formed scene document.
    #[error("scene JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    /// The top-level discriminator is not `"scene"`.
    #[error("expected a 'scene' document, found '{0}'")]
    WrongKind(String),
}

/// A failure reading or writing an asset file.
#[derive(Debug, Error)]
pub enum AssetError {
    /// File-system access failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not the expected JSON document.
    #[error("invalid document {}: {source}", path.display())]
    Json {
        /// The offending file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The scene could not be loaded.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// A variant could not be serialized or rebuilt.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    /// A directory could not be located by walking upwards.
    #[error("no '{name}' directory within {depth} levels above {}", start.display())]
    NotFound {
        /// The directory name searched for.
        name: &'static str,
        /// Where the search started.
        start: PathBuf,
        /// How many parents were inspected.
        depth: usize,
    },
}
