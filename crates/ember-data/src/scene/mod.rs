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

//! Scene persistence: the reflection serializer and the on-disk documents.
//!
//! The JSON shapes are fixed:
//! * variant: `{"type": "<TypeName>", "value": {<properties>}}`
//! * entity: `{"entity_id": <uint>, "variants": [<variant>, ...]}`
//! * scene: `{"type": "scene", "entities": [<entity>, ...]}`
//! * prefab (`*.variant`): a single variant, or `{"variants": [...]}`
//! * requires (`<TypeName>.requires`): `{"requires": ["<TypeName>", ...]}`

mod assets;
mod document;
mod error;
mod json;
mod library;
mod resources;
mod serializer;

pub use assets::{
    generate_templates, load_entity, load_scene, read_json, save_entity, save_scene,
    write_json, write_requires, ENTITY_EXTENSION, REQUIRES_EXTENSION, SCENE_EXTENSION,
    VARIANT_EXTENSION,
};
pub use document::{
    entities_skipping_malformed, EntityDocument, PrefabDocument, RequiresDocument,
    SceneDocument, VariantDocument, SCENE_KIND,
};
pub use error::{AssetError, SceneError, SerializeError};
pub use json::{json_to_value, value_to_json};
pub use library::{DuplicatePolicy, EntityTarget, VariantLibrary, VariantTarget};
pub use resources::ResourcePaths;
pub use serializer::{
    apply_properties, apply_scene, deserialize_entity, deserialize_scene, deserialize_variant,
    serialize_entity, serialize_properties, serialize_scene, serialize_variant,
};
