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

//! File helpers for `.entity`, `.scene`, `.variant` and `.requires` assets.

use super::document::{EntityDocument, RequiresDocument, SceneDocument, VariantDocument};
use super::error::AssetError;
use super::error::SerializeError;
use super::serializer::{
    apply_scene, deserialize_entity, serialize_entity, serialize_properties, serialize_scene,
};
use crate::storage::Storage;
use ember_core::reflect::{TypeRegistry, VARIANT_BASE};
use ember_core::{EntityId, VariantCreateInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of saved entities.
pub const ENTITY_EXTENSION: &str = "entity";
/// Extension of variant templates and prefabs.
pub const VARIANT_EXTENSION: &str = "variant";
/// Extension of saved scenes.
pub const SCENE_EXTENSION: &str = "scene";
/// Extension of requires lists.
pub const REQUIRES_EXTENSION: &str = "requires";

/// Reads and parses a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<(), AssetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| AssetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serde_json::to_string_pretty(document).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves one entity of the store as `<dir>/<name>.entity`.
pub fn save_entity(
    storage: &Storage,
    entity: EntityId,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, AssetError> {
    let document = serialize_entity(storage.registry(), entity, storage.variants(entity));
    let path = dir.join(format!("{name}.{ENTITY_EXTENSION}"));
    write_json(&path, &document)?;
    log::info!("Saved entity {entity} to {}.", path.display());
    Ok(path)
}

/// Loads an `.entity` file into the store.
///
/// Any variants already on the same entity id are replaced.
pub fn load_entity(storage: &mut Storage, path: &Path) -> Result<EntityId, AssetError> {
    let document: EntityDocument = read_json(path)?;
    let (entity, cells) = deserialize_entity(storage.registry(), &document);

    storage.remove_entity(entity);
    storage.ensure_entity(entity);
    for cell in cells {
        storage.insert_cell(cell);
    }
    log::info!("Loaded entity {entity} from {}.", path.display());
    Ok(entity)
}

/// Saves the whole store to `path`.
pub fn save_scene(storage: &Storage, path: &Path) -> Result<(), AssetError> {
    write_json(path, &serialize_scene(storage))?;
    log::info!("Saved scene to {}.", path.display());
    Ok(())
}

/// Replaces the store's contents with the scene at `path`.
pub fn load_scene(storage: &mut Storage, path: &Path) -> Result<usize, AssetError> {
    let document: SceneDocument = read_json(path)?;
    Ok(apply_scene(storage, &document)?)
}

/// Writes a default-valued `<Type>.variant` template for every
/// constructible variant type.
///
/// Existing templates of the same name are overwritten; multi-variant
/// prefabs are left alone.
pub fn generate_templates(registry: &TypeRegistry, dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let info = VariantCreateInfo {
        entity_id: EntityId(0),
    };
    let mut written = Vec::new();
    for descriptor in registry.all_descended_from(VARIANT_BASE) {
        let (_, instance) = registry
            .instantiate(descriptor.name(), &info, &[])
            .map_err(SerializeError::from)?;
        let document = VariantDocument {
            type_name: descriptor.name().to_string(),
            value: serialize_properties(descriptor, instance.as_ref().as_any()),
        };
        let path = dir.join(format!("{}.{VARIANT_EXTENSION}", descriptor.name()));
        write_json(&path, &document)?;
        log::debug!("Generated template {}.", path.display());
        written.push(path);
    }
    log::info!("Generated {} variant templates in {}.", written.len(), dir.display());
    Ok(written)
}

/// Writes `<dir>/<owner>.requires`.
pub fn write_requires(dir: &Path, owner: &str, requires: &[&str]) -> Result<PathBuf, AssetError> {
    let document = RequiresDocument {
        requires: requires.iter().map(|name| name.to_string()).collect(),
    };
    let path = dir.join(format!("{owner}.{REQUIRES_EXTENSION}"));
    write_json(&path, &document)?;
    Ok(path)
}

/// Files directly inside `dir` with the given extension, sorted by name.
///
/// A missing directory yields no files.
pub(crate) fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AssetError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(AssetError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    Ok(files)
}
