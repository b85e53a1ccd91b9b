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

//! Reflection-driven conversion between the store and JSON documents.
//!
//! Nothing here knows about concrete component types: every property is
//! read and written through the [`TypeRegistry`]'s descriptors.

use super::document::{EntityDocument, SceneDocument, VariantDocument, SCENE_KIND};
use super::error::{SceneError, SerializeError};
use super::json::{json_to_value, value_to_json};
use crate::storage::{Storage, VariantCell};
use ember_core::reflect::{TypeDescriptor, TypeRegistry};
use ember_core::{EntityId, VariantCreateInfo};
use serde_json::{Map, Value as JsonValue};
use std::any::Any;
use std::sync::Arc;

/// Serializes every property not flagged `no_serialize`, in declaration order.
///
/// A property that fails to convert is logged and left out; its siblings
/// are still emitted.
pub fn serialize_properties(descriptor: &TypeDescriptor, instance: &dyn Any) -> Map<String, JsonValue> {
    let mut object = Map::new();
    for property in descriptor.properties() {
        if property.metadata.no_serialize {
            continue;
        }
        let converted = (property.get)(instance)
            .map_err(|e| e.to_string())
            .and_then(|value| value_to_json(&value));
        match converted {
            Ok(json) => {
                object.insert(property.name.to_string(), json);
            }
            Err(reason) => log::error!(
                "Skipping property '{}.{}' during serialization: {reason}",
                descriptor.name(),
                property.name
            ),
        }
    }
    object
}

/// Serializes one variant to `{"type", "value"}`.
pub fn serialize_variant(
    registry: &TypeRegistry,
    cell: &VariantCell,
) -> Result<VariantDocument, SerializeError> {
    let descriptor = registry.resolve(cell.type_name())?;
    let instance = cell
        .instance()
        .ok_or(SerializeError::CheckedOut(cell.type_name()))?;
    Ok(VariantDocument {
        type_name: descriptor.name().to_string(),
        value: serialize_properties(descriptor, instance.as_any()),
    })
}

/// Serializes an entity's live variants.
///
/// A variant that fails to serialize is logged and skipped.
pub fn serialize_entity(
    registry: &TypeRegistry,
    entity_id: EntityId,
    cells: &[VariantCell],
) -> EntityDocument {
    let variants = cells
        .iter()
        .filter(|cell| !cell.is_dead())
        .filter_map(|cell| match serialize_variant(registry, cell) {
            Ok(document) => Some(document),
            Err(e) => {
                log::error!("Skipping variant of entity {entity_id}: {e}");
                None
            }
        })
        .collect();
    EntityDocument {
        entity_id,
        variants,
    }
}

/// Serializes the whole store.
///
/// Must only be called between phases, never from inside a hook.
pub fn serialize_scene(storage: &Storage) -> SceneDocument {
    let registry = storage.registry();
    SceneDocument::new(
        storage
            .iter()
            .map(|(entity_id, cells)| serialize_entity(registry, entity_id, cells))
            .collect(),
    )
}

/// Sets every member of `object` that names a property of `descriptor`.
///
/// Unknown members and members naming a `no_serialize` property are
/// ignored. A member that fails to convert is logged
/// and skipped. `on_set` callbacks run right after their property is set.
/// Returns how many properties were applied.
pub fn apply_properties(
    descriptor: &TypeDescriptor,
    instance: &mut dyn Any,
    object: &Map<String, JsonValue>,
) -> usize {
    let mut applied = 0;
    for (name, json) in object {
        match descriptor.property(name) {
            Some(property) if !property.metadata.no_serialize => {}
            _ => {
                log::trace!("Ignoring member '{name}' for '{}'.", descriptor.name());
                continue;
            }
        }
        match descriptor.set(instance, name, json_to_value(json)) {
            Ok(()) => applied += 1,
            Err(e) => log::warn!(
                "Could not apply '{}.{name}': {e}",
                descriptor.name()
            ),
        }
    }
    applied
}

/// Builds a variant bound to `entity_id` from its document.
pub fn deserialize_variant(
    registry: &TypeRegistry,
    entity_id: EntityId,
    document: &VariantDocument,
) -> Result<VariantCell, SerializeError> {
    let info = VariantCreateInfo { entity_id };
    let (descriptor, mut instance) = registry.instantiate(&document.type_name, &info, &[])?;
    apply_properties(descriptor, instance.as_mut().as_any_mut(), &document.value);
    Ok(VariantCell::new(entity_id, descriptor.name(), instance))
}

/// Builds every variant of an entity document.
///
/// Variants of unknown types are logged and skipped.
pub fn deserialize_entity(
    registry: &TypeRegistry,
    document: &EntityDocument,
) -> (EntityId, Vec<VariantCell>) {
    let cells = document
        .variants
        .iter()
        .filter_map(|variant| {
            match deserialize_variant(registry, document.entity_id, variant) {
                Ok(cell) => Some(cell),
                Err(e) => {
                    log::error!(
                        "Skipping '{}' of entity {}: {e}",
                        variant.type_name,
                        document.entity_id
                    );
                    None
                }
            }
        })
        .collect();
    (document.entity_id, cells)
}

/// Replaces the store's contents with a parsed scene document.
///
/// The discriminator is checked before anything is cleared, so a rejected
/// document leaves the store untouched. Returns the number of entities loaded.
pub fn apply_scene(storage: &mut Storage, document: &SceneDocument) -> Result<usize, SceneError> {
    if document.kind != SCENE_KIND {
        return Err(SceneError::WrongKind(document.kind.clone()));
    }

    storage.clear();
    let registry = Arc::clone(storage.registry());
    for entity in &document.entities {
        let (entity_id, cells) = deserialize_entity(&registry, entity);
        storage.ensure_entity(entity_id);
        for cell in cells {
            storage.insert_cell(cell);
        }
    }

    log::info!("Loaded scene with {} entities.", document.entities.len());
    Ok(document.entities.len())
}

/// Parses `json` as a scene and replaces the store's contents with it.
pub fn deserialize_scene(storage: &mut Storage, json: &str) -> Result<usize, SceneError> {
    let document: SceneDocument = serde_json::from_str(json)?;
    apply_scene(storage, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::reflect::{Reflected, TypeRegistry};
    use ember_core::{Reflect, Variant};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Reflect)]
    #[reflect(variant)]
    struct Gauge {
        level: f32,
        label: String,
        #[reflect(no_serialize)]
        scratch: i32,
    }

    impl Variant for Gauge {}

    fn storage() -> Storage {
        let mut registry = TypeRegistry::new();
        registry.register(Gauge::type_descriptor()).unwrap();
        Storage::new(Arc::new(registry))
    }

    #[test]
    fn no_serialize_properties_are_left_out() {
        let mut storage = storage();
        let entity = storage.create_entity();
        let cell = storage.attach(
            entity,
            Gauge {
                level: 0.5,
                label: "fuel".to_string(),
                scratch: 9,
            },
        );

        let document = serialize_variant(&Arc::new(TypeRegistry::new()), cell);
        assert!(document.is_err(), "An empty registry cannot resolve the type");

        let registry = Arc::clone(storage.registry());
        let cell = &storage.variants(entity)[0];
        let document = serialize_variant(&registry, cell).unwrap();
        assert_eq!(JsonValue::Object(document.value), json!({"level": 0.5, "label": "fuel"}));
    }

    #[test]
    fn dead_variants_are_not_serialized() {
        let mut storage = storage();
        let entity = storage.create_entity();
        storage.attach(entity, Gauge::default());
        storage.remove_variant(entity, "Gauge");

        let scene = serialize_scene(&storage);

        assert_eq!(scene.entities.len(), 1);
        assert!(scene.entities[0].variants.is_empty());
    }

    #[test]
    fn unknown_members_are_ignored() {
        let descriptor = Gauge::type_descriptor();
        let mut gauge = Gauge::default();
        let object = json!({"level": 2, "colour": "red"});

        let applied = apply_properties(&descriptor, &mut gauge, object.as_object().unwrap());

        assert_eq!(applied, 1);
        assert_eq!(gauge.level, 2.0);
    }

    #[test]
    fn bad_member_does_not_block_siblings() {
        let descriptor = Gauge::type_descriptor();
        let mut gauge = Gauge::default();
        let object = json!({"level": "high", "label": "tank"});

        let applied = apply_properties(&descriptor, &mut gauge, object.as_object().unwrap());

        assert_eq!(applied, 1);
        assert_eq!(gauge.level, 0.0);
        assert_eq!(gauge.label, "tank");
    }

    #[test]
    fn no_serialize_members_are_not_applied() {
        let descriptor = Gauge::type_descriptor();
        let mut gauge = Gauge::default();
        let object = json!({"scratch": 4});

        let applied = apply_properties(&descriptor, &mut gauge, object.as_object().unwrap());

        assert_eq!(applied, 0);
        assert_eq!(gauge.scratch, 0);
    }

    #[test]
    fn wrong_discriminator_leaves_store_untouched() {
        let mut storage = storage();
        let entity = storage.create_entity();
        storage.attach(entity, Gauge::default());

        let result = deserialize_scene(&mut storage, r#"{"type": "entity", "entities": []}"#);

        assert!(matches!(result, Err(SceneError::WrongKind(ref kind)) if kind == "entity"));
        assert!(storage.get_variant::<Gauge>(entity).is_some());
    }

    #[test]
    fn unparseable_scene_is_an_error() {
        let mut storage = storage();

        let result = deserialize_scene(&mut storage, "{not json");

        assert!(matches!(result, Err(SceneError::Parse(_))));
    }

    #[test]
    fn malformed_entities_and_variants_are_skipped() {
        let mut storage = storage();
        let json = json!({
            "type": "scene",
            "entities": [
                {
                    "entity_id": 1,
                    "variants": [
                        {"type": "Gauge", "value": 5},
                        {"type": "Gauge", "value": {"level": 7.0}}
                    ]
                },
                {"entity_id": "oops", "variants": []},
                {"entity_id": 3, "variants": "none"},
                {"entity_id": 4, "variants": [{"value": {}}]}
            ]
        })
        .to_string();

        let loaded = deserialize_scene(&mut storage, &json).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(storage.variants(EntityId(1)).len(), 1);
        assert_eq!(storage.get_variant::<Gauge>(EntityId(1)).unwrap().level, 7.0);
        assert!(!storage.contains_entity(EntityId(3)));
        assert!(storage.contains_entity(EntityId(4)));
        assert!(storage.variants(EntityId(4)).is_empty());
    }

    #[test]
    fn unknown_variant_types_are_skipped_per_variant() {
        let mut storage = storage();
        let json = json!({
            "type": "scene",
            "entities": [{
                "entity_id": 12,
                "variants": [
                    {"type": "Ghost", "value": {}},
                    {"type": "Gauge", "value": {"level": 3.0}}
                ]
            }]
        })
        .to_string();

        let loaded = deserialize_scene(&mut storage, &json).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(storage.variants(EntityId(12)).len(), 1);
        assert_eq!(storage.get_variant::<Gauge>(EntityId(12)).unwrap().level, 3.0);
        assert_eq!(storage.create_entity(), EntityId(13), "Loaded ids are observed");
    }
}
