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

use ember_core::reflect::{ReflectError, RegistryError};
use ember_core::EntityId;
use thiserror::Error;

/// A failure mutating the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The type registry could not resolve or build the variant.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// No such entity.
    #[error("entity {0} not found")]
    UnknownEntity(EntityId),
    /// The entity has no live variant of that type.
    #[error("entity {entity} has no live '{type_name}' variant")]
    MissingVariant {
        /// The entity searched.
        entity: EntityId,
        /// The requested type.
        type_name: String,
    },
    /// A dotted property path could not be applied.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// A failure resolving a dotted property path.
#[derive(Debug, Error)]
pub enum PathError {
    /// Empty path or empty segment.
    #[error("invalid property path '{0}'")]
    Invalid(String),
    /// An intermediate segment named no member.
    #[error("no member '{segment}' along the path")]
    MissingMember {
        /// The unmatched segment.
        segment: String,
    },
    /// An intermediate value cannot be descended into.
    #[error("cannot descend into {found} at '{segment}'")]
    NotTraversable {
        /// The segment that failed.
        segment: String,
        /// The kind of value found there.
        found: &'static str,
    },
    /// Reading or writing the top-level property failed.
    #[error(transparent)]
    Reflect(#[from] ReflectError),
}
