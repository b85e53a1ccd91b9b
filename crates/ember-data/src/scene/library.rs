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

//! Templates, prefabs and requires lists, and attaching them to entities.

use super::assets::{files_with_extension, read_json, REQUIRES_EXTENSION, VARIANT_EXTENSION};
use super::document::{EntityDocument, PrefabDocument, RequiresDocument, VariantDocument};
use super::error::{AssetError, SerializeError};
use super::serializer::deserialize_variant;
use crate::storage::Storage;
use ember_core::EntityId;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// What to do when a variant type is already on the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the existing variant alone.
    #[default]
    Skip,
    /// Append another variant of the same type.
    Allow,
}

/// Something variants can be attached to: an entity document being
/// edited, or a live entity in the store.
pub trait VariantTarget {
    /// True if a variant of `type_name` is already attached.
    fn has_variant(&self, type_name: &str) -> bool;
    /// Appends a variant built from `variant`.
    fn attach(&mut self, variant: &VariantDocument) -> Result<(), SerializeError>;
}

impl VariantTarget for EntityDocument {
    fn has_variant(&self, type_name: &str) -> bool {
        self.variant(type_name).is_some()
    }

    fn attach(&mut self, variant: &VariantDocument) -> Result<(), SerializeError> {
        self.variants.push(variant.clone());
        Ok(())
    }
}

/// A live entity in a [`Storage`].
pub struct EntityTarget<'s> {
    /// The store holding the entity.
    pub storage: &'s mut Storage,
    /// The entity to attach to. Created if missing.
    pub entity: EntityId,
}

impl VariantTarget for EntityTarget<'_> {
    fn has_variant(&self, type_name: &str) -> bool {
        self.storage.has_variant(self.entity, type_name)
    }

    fn attach(&mut self, variant: &VariantDocument) -> Result<(), SerializeError> {
        let cell = deserialize_variant(self.storage.registry(), self.entity, variant)?;
        self.storage.ensure_entity(self.entity);
        self.storage.insert_cell(cell);
        Ok(())
    }
}

/// Every `.variant` and `.requires` asset known to the editor.
#[derive(Debug, Clone, Default)]
pub struct VariantLibrary {
    prefabs: BTreeMap<String, PrefabDocument>,
    requires: BTreeMap<String, Vec<String>>,
}

impl VariantLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `<variants>/*.variant` and `<requires>/*.requires`.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load(variants_dir: &Path, requires_dir: &Path) -> Result<Self, AssetError> {
        let mut library = Self::new();

        for path in files_with_extension(variants_dir, VARIANT_EXTENSION)? {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_json::<PrefabDocument>(&path) {
                Ok(prefab) => library.insert_prefab(name, prefab),
                Err(e) => log::error!("Skipping prefab: {e}"),
            }
        }

        for path in files_with_extension(requires_dir, REQUIRES_EXTENSION)? {
            let Some(owner) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_json::<RequiresDocument>(&path) {
                Ok(document) => library.set_requires(owner, document.requires),
                Err(e) => log::error!("Skipping requires list: {e}"),
            }
        }

        log::info!(
            "Variant library loaded {} prefabs and {} requires lists.",
            library.prefabs.len(),
            library.requires.len()
        );
        Ok(library)
    }

    /// Registers a single-variant template under its type name.
    pub fn insert_template(&mut self, template: VariantDocument) {
        let name = template.type_name.clone();
        self.prefabs.insert(name, PrefabDocument::Single(template));
    }

    /// Registers a prefab under `name`, replacing any previous one.
    pub fn insert_prefab(&mut self, name: &str, prefab: PrefabDocument) {
        self.prefabs.insert(name.to_string(), prefab);
    }

    /// Declares the types that must accompany `owner`.
    pub fn set_requires(&mut self, owner: &str, requires: Vec<String>) {
        self.requires.insert(owner.to_string(), requires);
    }

    /// The single-variant template registered for `type_name`.
    pub fn template(&self, type_name: &str) -> Option<&VariantDocument> {
        match self.prefabs.get(type_name)? {
            PrefabDocument::Single(variant) if variant.type_name == type_name => Some(variant),
            _ => None,
        }
    }

    /// The prefab registered under `name`.
    pub fn prefab(&self, name: &str) -> Option<&PrefabDocument> {
        self.prefabs.get(name)
    }

    /// Names of every prefab, sorted.
    pub fn prefab_names(&self) -> impl Iterator<Item = &str> {
        self.prefabs.keys().map(String::as_str)
    }

    /// Types required by `owner`.
    pub fn requires(&self, owner: &str) -> &[String] {
        self.requires.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attaches the prefab called `name` to `target`, then whatever its
    /// variants require.
    ///
    /// An unknown name is treated as a bare type name with default values.
    /// Required types are only added when missing, whatever the policy.
    /// Returns the type names actually attached, in order.
    pub fn attach(
        &self,
        target: &mut dyn VariantTarget,
        name: &str,
        policy: DuplicatePolicy,
    ) -> Vec<String> {
        let fallback;
        let variants = match self.prefabs.get(name) {
            Some(prefab) => prefab.variants(),
            None => {
                fallback = VariantDocument::empty(name);
                std::slice::from_ref(&fallback)
            }
        };

        let mut attached = Vec::new();
        for variant in variants {
            if policy == DuplicatePolicy::Skip && target.has_variant(&variant.type_name) {
                log::info!("'{}' is already attached, skipping.", variant.type_name);
                continue;
            }
            if self.attach_one(target, variant, &mut attached) {
                let mut visited = HashSet::from([variant.type_name.clone()]);
                self.attach_requires(target, &variant.type_name, &mut visited, &mut attached);
            }
        }
        attached
    }

    fn attach_requires(
        &self,
        target: &mut dyn VariantTarget,
        owner: &str,
        visited: &mut HashSet<String>,
        attached: &mut Vec<String>,
    ) {
        for required in self.requires(owner) {
            if !visited.insert(required.clone()) || target.has_variant(required) {
                continue;
            }
            log::trace!("'{owner}' requires '{required}'.");
            let variant = self
                .template(required)
                .cloned()
                .unwrap_or_else(|| VariantDocument::empty(required.as_str()));
            if self.attach_one(target, &variant, attached) {
                self.attach_requires(target, required, visited, attached);
            }
        }
    }

    fn attach_one(
        &self,
        target: &mut dyn VariantTarget,
        variant: &VariantDocument,
        attached: &mut Vec<String>,
    ) -> bool {
        match target.attach(variant) {
            Ok(()) => {
                attached.push(variant.type_name.clone());
                true
            }
            Err(e) => {
                log::error!("Could not attach '{}': {e}", variant.type_name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> VariantLibrary {
        let mut library = VariantLibrary::new();
        library.insert_template(VariantDocument {
            type_name: "Position".to_string(),
            value: json!({"x": 1.0}).as_object().cloned().unwrap(),
        });
        library.set_requires("Velocity", vec!["Position".to_string()]);
        library.set_requires("Position", vec!["Velocity".to_string()]);
        library
    }

    #[test]
    fn requires_are_attached_once_and_cycles_terminate() {
        let library = library();
        let mut entity = EntityDocument::new(EntityId(1));

        let attached = library.attach(&mut entity, "Velocity", DuplicatePolicy::Skip);

        assert_eq!(attached, vec!["Velocity", "Position"]);
        assert_eq!(entity.variant("Position").unwrap().value["x"], json!(1.0));
    }

    #[test]
    fn skip_policy_keeps_existing_variant() {
        let library = library();
        let mut entity = EntityDocument::new(EntityId(1));
        entity.variants.push(VariantDocument::empty("Position"));

        let attached = library.attach(&mut entity, "Position", DuplicatePolicy::Skip);

        assert!(attached.is_empty());
        assert_eq!(entity.variants.len(), 1);
    }

    #[test]
    fn allow_policy_appends_but_requires_stay_unique() {
        let library = library();
        let mut entity = EntityDocument::new(EntityId(1));
        library.attach(&mut entity, "Velocity", DuplicatePolicy::Skip);

        let attached = library.attach(&mut entity, "Velocity", DuplicatePolicy::Allow);

        assert_eq!(attached, vec!["Velocity"]);
        assert_eq!(entity.variants.len(), 3);
    }

    #[test]
    fn multi_prefab_attaches_every_variant() {
        let mut library = VariantLibrary::new();
        library.insert_prefab(
            "Player",
            serde_json::from_value(json!({
                "variants": [{"type": "Tag", "value": {"name": "player"}}, {"type": "Sprite"}]
            }))
            .unwrap(),
        );
        let mut entity = EntityDocument::new(EntityId(3));

        let attached = library.attach(&mut entity, "Player", DuplicatePolicy::Skip);

        assert_eq!(attached, vec!["Tag", "Sprite"]);
        assert!(library.template("Player").is_none());
    }
}
