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

use ember_core::EntityId;
use ember_data::scene::AssetError;
use ember_sync::{ProtocolError, TransportError};
use thiserror::Error;

/// Errors surfaced by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The mirror has no such entity.
    #[error("entity {0} is not in the scene")]
    UnknownEntity(EntityId),
    /// The entity has no such variant.
    #[error("entity {entity} has no '{variant}' variant")]
    UnknownVariant {
        /// The entity.
        entity: EntityId,
        /// The missing type.
        variant: String,
    },
    /// The key path runs through a non-object member.
    #[error("cannot write '{0}'")]
    InvalidPath(String),
    /// The value does not match its key type.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The engine link failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Reading or writing a scene file failed.
    #[error(transparent)]
    Asset(#[from] AssetError),
}
