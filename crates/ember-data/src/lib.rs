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

//! # Ember Data
//!
//! The authoritative entity/variant store, the reflection-driven JSON
//! serializer, and the on-disk documents (entities, variant templates,
//! prefabs, requires lists) built on top of it.

pub mod scene;
pub mod storage;
pub mod variants;

pub use scene::{
    deserialize_entity, deserialize_scene, deserialize_variant, serialize_entity,
    serialize_scene, serialize_variant, EntityDocument, SceneDocument, VariantDocument,
};
pub use storage::{Phase, Storage, StorageError, VariantCell};
pub use variants::{builtin_registry, BUILTIN_REQUIRES};
