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

use crate::error::EditorError;
use ember_core::EntityId;
use ember_data::scene::{
    read_json, value_to_json, write_json, AssetError, DuplicatePolicy, EntityDocument,
    SceneDocument, SceneError, VariantDocument, VariantLibrary, SCENE_KIND,
};
use ember_sync::{KeyType, SyncEndpoint, SyncMessage};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use std::time::Duration;

/// The editor's view of the engine's play mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayState {
    /// Editing.
    #[default]
    Edit,
    /// The engine simulates.
    Playing,
    /// The engine is in play mode but frozen.
    Paused,
}

/// One editor's connection to one engine.
///
/// The scene mirror is edited locally and every edit is forwarded as a
/// delta, so the mirror and the engine's store stay in step without
/// resending the whole scene.
pub struct EditorSession {
    endpoint: SyncEndpoint,
    library: VariantLibrary,
    scene: SceneDocument,
    play_state: PlayState,
    engine_alive: bool,
}

impl EditorSession {
    /// Wraps a started editor endpoint.
    pub fn new(endpoint: SyncEndpoint, library: VariantLibrary) -> Self {
        Self {
            endpoint,
            library,
            scene: SceneDocument::new(Vec::new()),
            play_state: PlayState::Edit,
            engine_alive: false,
        }
    }

    /// The scene mirror.
    pub fn scene(&self) -> &SceneDocument {
        &self.scene
    }

    /// One entity of the mirror.
    pub fn entity(&self, entity: EntityId) -> Option<&EntityDocument> {
        self.scene.entity(entity)
    }

    /// The templates and prefabs available to [`add_variant`](Self::add_variant).
    pub fn library(&self) -> &VariantLibrary {
        &self.library
    }

    /// The engine's play mode as last commanded.
    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    /// The underlying endpoint.
    pub fn endpoint(&self) -> &SyncEndpoint {
        &self.endpoint
    }

    /// True if the engine announced itself, has not shut down, and pinged
    /// within `timeout` (or never pinged yet).
    pub fn is_engine_alive(&self, timeout: Duration) -> bool {
        self.engine_alive
            && self.endpoint.is_link_open()
            && self
                .endpoint
                .last_heartbeat()
                .map_or(true, |seen| seen.elapsed() <= timeout)
    }

    /// Replaces the mirror with a scene file. Nothing is sent.
    pub fn load_scene(&mut self, path: &Path) -> Result<(), EditorError> {
        let scene: SceneDocument = read_json(path)?;
        if scene.kind != SCENE_KIND {
            return Err(AssetError::from(SceneError::WrongKind(scene.kind)).into());
        }
        log::info!("Loaded {} entities from {}.", scene.entities.len(), path.display());
        self.scene = scene;
        Ok(())
    }

    /// Writes the mirror to a scene file.
    pub fn save_scene(&self, path: &Path) -> Result<(), EditorError> {
        write_json(path, &self.scene)?;
        Ok(())
    }

    /// Sends the whole mirror, replacing the engine's store.
    pub fn push_scene(&self) -> Result<(), EditorError> {
        self.send(SyncMessage::scene(self.scene.clone()))
    }

    /// Adds an empty entity to the mirror with a fresh id.
    ///
    /// The engine learns about it once a variant is added.
    pub fn create_entity(&mut self) -> EntityId {
        let next = self
            .scene
            .entities
            .iter()
            .map(|e| e.entity_id.raw())
            .max()
            .unwrap_or(0)
            + 1;
        let id = EntityId(next);
        self.scene.entities.push(EntityDocument::new(id));
        id
    }

    /// Changes one property, locally and on the engine.
    pub fn set_property(
        &mut self,
        entity: EntityId,
        variant: &str,
        key_path: &str,
        key_type: KeyType,
        value: &str,
    ) -> Result<(), EditorError> {
        let json = value_to_json(&key_type.parse(value)?).map_err(EditorError::InvalidPath)?;
        let document = self
            .scene
            .entity_mut(entity)
            .ok_or(EditorError::UnknownEntity(entity))?
            .variant_mut(variant)
            .ok_or_else(|| EditorError::UnknownVariant {
                entity,
                variant: variant.to_string(),
            })?;
        if !document.set_path(key_path, json) {
            return Err(EditorError::InvalidPath(key_path.to_string()));
        }

        self.send(SyncMessage::EntityPropertyChanged {
            entity_id: entity,
            variant_type: variant.to_string(),
            key_type,
            key_path: key_path.to_string(),
            value: value.to_string(),
        })
    }

    /// Attaches a template or prefab (and whatever it requires) to `entity`.
    ///
    /// Each attached type is announced to the engine, followed by the
    /// template's property values. Returns the attached type names.
    pub fn add_variant(&mut self, entity: EntityId, prefab: &str) -> Result<Vec<String>, EditorError> {
        if self.scene.entity(entity).is_none() {
            self.scene.entities.push(EntityDocument::new(entity));
        }
        let document = self
            .scene
            .entity_mut(entity)
            .ok_or(EditorError::UnknownEntity(entity))?;
        let attached = self.library.attach(document, prefab, DuplicatePolicy::Skip);
        let added = document.variants[document.variants.len() - attached.len()..].to_vec();

        for variant in &added {
            self.send(SyncMessage::EntityVariantAdded {
                entity_id: entity,
                variant_type: variant.type_name.clone(),
            })?;
            for (key_path, key_type, value) in property_deltas(variant) {
                self.send(SyncMessage::EntityPropertyChanged {
                    entity_id: entity,
                    variant_type: variant.type_name.clone(),
                    key_type,
                    key_path,
                    value,
                })?;
            }
        }
        Ok(attached)
    }

    /// Removes every variant of `variant` from `entity`.
    pub fn remove_variant(&mut self, entity: EntityId, variant: &str) -> Result<(), EditorError> {
        let removed = self
            .scene
            .entity_mut(entity)
            .ok_or(EditorError::UnknownEntity(entity))?
            .remove_variant(variant);
        if removed == 0 {
            return Err(EditorError::UnknownVariant {
                entity,
                variant: variant.to_string(),
            });
        }
        self.send(SyncMessage::EntityVariantRemoved {
            entity_id: entity,
            variant_type: variant.to_string(),
        })
    }

    /// Deletes an entity.
    pub fn remove_entity(&mut self, entity: EntityId) -> Result<(), EditorError> {
        let before = self.scene.entities.len();
        self.scene.entities.retain(|e| e.entity_id != entity);
        if self.scene.entities.len() == before {
            return Err(EditorError::UnknownEntity(entity));
        }
        self.send(SyncMessage::EntityRemoved { entity_id: entity })
    }

    /// Starts the simulation.
    pub fn enter_play_mode(&mut self, is_paused: bool) -> Result<(), EditorError> {
        self.send(SyncMessage::EnterPlayMode { is_paused })?;
        if self.play_state == PlayState::Edit {
            self.play_state = if is_paused {
                PlayState::Paused
            } else {
                PlayState::Playing
            };
        }
        Ok(())
    }

    /// Stops the simulation; the engine answers with the restored scene.
    pub fn exit_play_mode(&mut self) -> Result<(), EditorError> {
        self.send(SyncMessage::ExitPlayMode)?;
        self.play_state = PlayState::Edit;
        Ok(())
    }

    /// Freezes the simulation.
    pub fn pause(&mut self) -> Result<(), EditorError> {
        self.send(SyncMessage::PausePlayMode)?;
        if self.play_state == PlayState::Playing {
            self.play_state = PlayState::Paused;
        }
        Ok(())
    }

    /// Resumes the simulation.
    pub fn unpause(&mut self) -> Result<(), EditorError> {
        self.send(SyncMessage::UnpausePlayMode)?;
        if self.play_state == PlayState::Paused {
            self.play_state = PlayState::Playing;
        }
        Ok(())
    }

    /// Asks the engine process to quit.
    pub fn kill_engine(&mut self) -> Result<(), EditorError> {
        self.send(SyncMessage::Die)
    }

    /// Drains the engine's messages.
    ///
    /// Scene snapshots replace the mirror, forwarded log lines are
    /// re-emitted under the `engine` target, and `engine_shutdown` marks
    /// the engine gone. Every message is returned.
    pub fn pump(&mut self) -> Vec<SyncMessage> {
        let messages = self.endpoint.raise_events();
        for message in &messages {
            match message {
                SyncMessage::Scene { entities } => {
                    self.scene = SceneDocument::new(entities.clone());
                }
                SyncMessage::LogMessage { level, message } => {
                    log::log!(target: "engine", log::Level::from(*level), "{message}");
                }
                SyncMessage::EngineStarted => {
                    self.engine_alive = true;
                }
                SyncMessage::EngineShutdown => {
                    log::info!("Engine shut down.");
                    self.engine_alive = false;
                    self.play_state = PlayState::Edit;
                }
                SyncMessage::Heartbeat => {}
                other => log::debug!("Ignoring '{}' from the engine.", other.kind()),
            }
        }
        messages
    }

    /// Closes the link.
    pub fn shutdown(&mut self) {
        self.endpoint.shutdown();
        self.engine_alive = false;
    }

    fn send(&self, message: SyncMessage) -> Result<(), EditorError> {
        Ok(self.endpoint.send(&message)?)
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("entities", &self.scene.entities.len())
            .field("play_state", &self.play_state)
            .field("engine_alive", &self.engine_alive)
            .finish_non_exhaustive()
    }
}

/// Scalar leaves of a variant document as `(key_path, key_type, value)`.
///
/// Containers cannot be expressed as single-field deltas and are skipped.
fn property_deltas(variant: &VariantDocument) -> Vec<(String, KeyType, String)> {
    let mut deltas = Vec::new();
    collect_deltas(&variant.value, "", &mut deltas);
    deltas
}

fn collect_deltas(object: &Map<String, JsonValue>, prefix: &str, out: &mut Vec<(String, KeyType, String)>) {
    for (name, value) in object {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            JsonValue::Bool(b) => out.push((path, KeyType::Bool, b.to_string())),
            JsonValue::Number(n) if n.is_f64() => out.push((path, KeyType::Float, n.to_string())),
            JsonValue::Number(n) => out.push((path, KeyType::Int, n.to_string())),
            JsonValue::String(s) => out.push((path, KeyType::String, s.clone())),
            JsonValue::Object(inner) => collect_deltas(inner, &path, out),
            JsonValue::Array(_) | JsonValue::Null => {
                log::debug!("Template member '{path}' is not a scalar; engine keeps its default.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deltas_flatten_nested_scalars_and_skip_containers() {
        let variant = VariantDocument {
            type_name: "Camera2D".to_string(),
            value: json!({
                "offset": {"x": 1.5, "y": 0.0},
                "zoom": 2.0,
                "label": "main",
                "layers": [1, 2],
                "visible": true,
                "order": 3
            })
            .as_object()
            .cloned()
            .unwrap(),
        };

        let deltas = property_deltas(&variant);

        assert_eq!(
            deltas,
            vec![
                ("offset.x".to_string(), KeyType::Float, "1.5".to_string()),
                ("offset.y".to_string(), KeyType::Float, "0.0".to_string()),
                ("zoom".to_string(), KeyType::Float, "2.0".to_string()),
                ("label".to_string(), KeyType::String, "main".to_string()),
                ("visible".to_string(), KeyType::Bool, "true".to_string()),
                ("order".to_string(), KeyType::Int, "3".to_string()),
            ]
        );
    }
}
