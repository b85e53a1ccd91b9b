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

//! Serde envelopes for the persisted and transmitted JSON shapes.
//!
//! Only the envelopes are typed here; property values stay as raw JSON
//! objects and go through reflection.

use ember_core::EntityId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Discriminator of a scene document.
pub const SCENE_KIND: &str = "scene";

/// One variant: `{"type": ..., "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDocument {
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Property name to JSON value, in declaration order.
    #[serde(default)]
    pub value: Map<String, JsonValue>,
}

impl VariantDocument {
    /// A variant with no property values, i.e. all defaults.
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: Map::new(),
        }
    }

    /// Writes `value` at a dotted path inside the property object.
    ///
    /// Intermediate objects are created as needed. Returns false if a
    /// non-object value sits in the way.
    pub fn set_path(&mut self, key_path: &str, value: JsonValue) -> bool {
        let mut segments = key_path.split('.').peekable();
        let mut cursor = &mut self.value;
        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return false;
            }
            if segments.peek().is_none() {
                cursor.insert(segment.to_string(), value);
                return true;
            }
            let next = cursor
                .entry(segment.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            match next {
                JsonValue::Object(object) => cursor = object,
                _ => return false,
            }
        }
        false
    }
}

/// Reads a list of entity documents, dropping entries that do not parse.
///
/// One bad entity (a non-numeric id, a missing field) is logged and
/// skipped; its siblings still load.
pub fn entities_skipping_malformed<'de, D>(deserializer: D) -> Result<Vec<EntityDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    skip_malformed(deserializer, "entity")
}

fn variants_skipping_malformed<'de, D>(deserializer: D) -> Result<Vec<VariantDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    skip_malformed(deserializer, "variant")
}

fn skip_malformed<'de, D, T>(deserializer: D, what: &str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<JsonValue>::deserialize(deserializer)?;
    let mut parsed = Vec::with_capacity(raw.len());
    for (index, item) in raw.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(document) => parsed.push(document),
            Err(e) => log::warn!("Skipping malformed {what} #{index}: {e}"),
        }
    }
    Ok(parsed)
}

/// One entity: `{"entity_id": ..., "variants": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// The entity id the variants belong to.
    pub entity_id: EntityId,
    /// Variants in insertion order.
    #[serde(default, deserialize_with = "variants_skipping_malformed")]
    pub variants: Vec<VariantDocument>,
}

impl EntityDocument {
    /// An entity with no variants.
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            variants: Vec::new(),
        }
    }

    /// First variant of `type_name`.
    pub fn variant(&self, type_name: &str) -> Option<&VariantDocument> {
        self.variants.iter().find(|v| v.type_name == type_name)
    }

    /// First variant of `type_name`, mutably.
    pub fn variant_mut(&mut self, type_name: &str) -> Option<&mut VariantDocument> {
        self.variants.iter_mut().find(|v| v.type_name == type_name)
    }

    /// Removes every variant of `type_name`. Returns how many were removed.
    pub fn remove_variant(&mut self, type_name: &str) -> usize {
        let before = self.variants.len();
        self.variants.retain(|v| v.type_name != type_name);
        before - self.variants.len()
    }
}

/// A whole store: `{"type": "scene", "entities": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Must be [`SCENE_KIND`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Every entity.
    #[serde(deserialize_with = "entities_skipping_malformed")]
    pub entities: Vec<EntityDocument>,
}

impl SceneDocument {
    /// Wraps entity documents in a scene envelope.
    pub fn new(entities: Vec<EntityDocument>) -> Self {
        Self {
            kind: SCENE_KIND.to_string(),
            entities,
        }
    }

    /// Looks up an entity by id.
    pub fn entity(&self, entity_id: EntityId) -> Option<&EntityDocument> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    /// Looks up an entity by id, mutably.
    pub fn entity_mut(&mut self, entity_id: EntityId) -> Option<&mut EntityDocument> {
        self.entities.iter_mut().find(|e| e.entity_id == entity_id)
    }
}

/// Contents of a `*.variant` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefabDocument {
    /// `{"variants": [...]}`, several components at once.
    Multi {
        /// The components.
        variants: Vec<VariantDocument>,
    },
    /// A single component template.
    Single(VariantDocument),
}

impl PrefabDocument {
    /// Every variant the prefab carries.
    pub fn variants(&self) -> &[VariantDocument] {
        match self {
            PrefabDocument::Multi { variants } => variants,
            PrefabDocument::Single(variant) => std::slice::from_ref(variant),
        }
    }

    /// True for single-component templates.
    pub fn is_single(&self) -> bool {
        matches!(self, PrefabDocument::Single(_))
    }
}

/// Contents of a `<TypeName>.requires` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiresDocument {
    /// Types to attach alongside the owner.
    pub requires: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefab_is_distinguished_by_variants_array() {
        let single: PrefabDocument =
            serde_json::from_value(json!({"type": "Position", "value": {"x": 1.0}})).unwrap();
        let multi: PrefabDocument = serde_json::from_value(json!({
            "variants": [
                {"type": "Position", "value": {}},
                {"type": "Velocity", "value": {"x": 2.0}}
            ]
        }))
        .unwrap();

        assert!(single.is_single());
        assert_eq!(single.variants()[0].type_name, "Position");
        assert!(!multi.is_single());
        assert_eq!(multi.variants().len(), 2);
    }

    #[test]
    fn entity_document_matches_file_shape() {
        let document = EntityDocument {
            entity_id: EntityId(4),
            variants: vec![VariantDocument::empty("Tag")],
        };

        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(
            json,
            json!({"entity_id": 4, "variants": [{"type": "Tag", "value": {}}]})
        );
    }

    #[test]
    fn scene_without_type_fails_to_parse() {
        let result = serde_json::from_value::<SceneDocument>(json!({"entities": []}));
        assert!(result.is_err());
    }

    #[test]
    fn set_path_creates_and_overwrites_members() {
        let mut variant = VariantDocument::empty("Camera2D");

        assert!(variant.set_path("zoom", json!(2.0)));
        assert!(variant.set_path("offset.x", json!(4.0)));
        assert!(!variant.set_path("zoom.inner", json!(1)), "zoom is not an object");

        assert_eq!(
            JsonValue::Object(variant.value),
            json!({"zoom": 2.0, "offset": {"x": 4.0}})
        );
    }
}
