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

//! The per-frame driver tying the store, play mode and the editor link together.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::play_mode::{PlayMode, PlayModeController};
use ember_core::event::EventBus;
use ember_core::reflect::TypeRegistry;
use ember_core::EntityId;
use ember_data::scene::{
    apply_scene, generate_templates, load_scene, write_requires, ResourcePaths, SceneDocument,
};
use ember_data::{serialize_scene, Phase, Storage, StorageError, BUILTIN_REQUIRES};
use ember_sync::{KeyType, SyncEndpoint, SyncMessage};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Undrained engine events kept before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// Notifications published by the engine on its [`EventBus`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A scene replaced the store.
    SceneLoaded {
        /// Entities in the new scene.
        entities: usize,
    },
    /// The play mode changed.
    PlayModeChanged(PlayMode),
    /// The editor asked the engine to quit.
    ShutdownRequested,
}

/// The engine process.
pub struct Engine {
    config: EngineConfig,
    storage: Storage,
    play_mode: PlayModeController,
    link: Option<SyncEndpoint>,
    events: EventBus<EngineEvent>,
    running: bool,
    scene_ready: bool,
    sync_requested: bool,
    since_sync: f32,
    since_heartbeat: f32,
    frame: u64,
}

impl Engine {
    /// Creates a standalone engine with an empty store.
    pub fn new(config: EngineConfig, registry: Arc<TypeRegistry>) -> Self {
        Self {
            config,
            storage: Storage::new(registry),
            play_mode: PlayModeController::new(),
            link: None,
            events: EventBus::bounded(EVENT_CAPACITY),
            running: true,
            scene_ready: false,
            sync_requested: false,
            since_sync: 0.0,
            since_heartbeat: 0.0,
            frame: 0,
        }
    }

    /// Attaches the editor link.
    pub fn with_link(mut self, link: SyncEndpoint) -> Self {
        self.link = Some(link);
        self
    }

    /// The settings in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The variant store.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The variant store, mutably.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Current play mode.
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode.mode()
    }

    /// Engine notifications. Only the newest [`EVENT_CAPACITY`] are kept.
    pub fn events(&self) -> &EventBus<EngineEvent> {
        &self.events
    }

    /// The editor link, if any.
    pub fn link(&self) -> Option<&SyncEndpoint> {
        self.link.as_ref()
    }

    /// False once shutdown was requested.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once a scene was loaded, from file or from the editor.
    pub fn is_scene_ready(&self) -> bool {
        self.scene_ready
    }

    /// Frames simulated so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Sends a scene snapshot at the end of the current frame.
    pub fn request_sync(&mut self) {
        self.sync_requested = true;
    }

    /// Stops the loop after the current frame.
    pub fn request_shutdown(&mut self) {
        self.running = false;
    }

    /// Writes the default variant templates and built-in requires lists.
    pub fn publish_templates(&self, paths: &ResourcePaths) -> Result<(), EngineError> {
        generate_templates(self.storage.registry(), &paths.variants()?)?;
        let requires_dir = paths.requires()?;
        for (owner, required) in BUILTIN_REQUIRES {
            write_requires(&requires_dir, owner, required)?;
        }
        Ok(())
    }

    /// Replaces the store with the scene at `path`.
    pub fn load_scene_file(&mut self, path: &Path) -> Result<usize, EngineError> {
        let entities = load_scene(&mut self.storage, path)?;
        self.scene_loaded(entities);
        Ok(entities)
    }

    /// Drains the link until the editor delivers a scene or `timeout` passes.
    pub fn wait_for_scene(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.scene_ready && self.running && Instant::now() < deadline {
            self.drain_link();
            if !self.scene_ready {
                thread::sleep(Duration::from_millis(10));
            }
        }
        self.scene_ready
    }

    /// Simulates one frame.
    ///
    /// Order: inbound messages, post-init, update, play phases when playing,
    /// garbage collection, then outbound snapshots and heartbeats. Snapshots
    /// are never taken while a phase runs.
    pub fn run_frame(&mut self, delta_seconds: f32) {
        self.drain_link();

        self.storage.set_delta_seconds(delta_seconds);
        for phase in Phase::FRAME {
            self.storage.run_phase(phase);
        }
        self.play_mode.run_play_phases(&mut self.storage);

        let collected = self.storage.garbage_collect();
        if collected > 0 {
            log::trace!("Collected {collected} dead variants.");
        }

        self.frame_boundary(delta_seconds);
        self.frame += 1;
    }

    /// Runs frames at the configured rate until shutdown or `max_frames`.
    pub fn run(&mut self, max_frames: Option<u64>) {
        let frame_seconds = self.config.frame_seconds();
        let frame_duration = Duration::from_secs_f32(frame_seconds);
        log::info!("Engine loop started at {} Hz.", self.config.frame_rate);

        while self.running && max_frames.map_or(true, |max| self.frame < max) {
            let start = Instant::now();
            self.run_frame(frame_seconds);
            if self.link.as_ref().is_some_and(|link| !link.is_link_open()) {
                log::warn!("Editor link closed; stopping.");
                self.running = false;
            }
            let elapsed = start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }
        log::info!("Engine loop stopped after {} frames.", self.frame);
    }

    /// Applies one message from the editor.
    pub fn handle_message(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::Scene { entities } => {
                if self.play_mode.is_in_play_mode() {
                    log::warn!("Scene received during play mode; replacing the running scene.");
                }
                match apply_scene(&mut self.storage, &SceneDocument::new(entities)) {
                    Ok(count) => self.scene_loaded(count),
                    Err(e) => log::error!("Rejected scene from editor: {e}"),
                }
            }
            SyncMessage::EntityPropertyChanged {
                entity_id,
                variant_type,
                key_type,
                key_path,
                value,
            } => self.change_property(entity_id, &variant_type, key_type, &key_path, &value),
            SyncMessage::EntityVariantAdded {
                entity_id,
                variant_type,
            } => {
                if let Err(e) = self.storage.add_variant(entity_id, &variant_type, &[]) {
                    log::warn!("Cannot add '{variant_type}' to entity {entity_id}: {e}");
                }
            }
            SyncMessage::EntityVariantRemoved {
                entity_id,
                variant_type,
            } => {
                if self.storage.remove_variant(entity_id, &variant_type) == 0 {
                    log::debug!("Entity {entity_id} has no '{variant_type}' to remove.");
                }
            }
            SyncMessage::EntityRemoved { entity_id } => {
                if !self.storage.remove_entity(entity_id) {
                    log::debug!("Entity {entity_id} was already gone.");
                }
            }
            SyncMessage::EnterPlayMode { is_paused } => self.enter_play_mode(is_paused),
            SyncMessage::ExitPlayMode => self.exit_play_mode(),
            SyncMessage::PausePlayMode => {
                if self.play_mode.pause() {
                    self.events.publish(EngineEvent::PlayModeChanged(PlayMode::Paused));
                }
            }
            SyncMessage::UnpausePlayMode => {
                if self.play_mode.unpause() {
                    self.events.publish(EngineEvent::PlayModeChanged(PlayMode::Playing));
                }
            }
            SyncMessage::Die => {
                log::info!("Editor requested shutdown.");
                self.running = false;
                self.events.publish(EngineEvent::ShutdownRequested);
            }
            SyncMessage::EngineStarted
            | SyncMessage::EngineStartConfirmed
            | SyncMessage::Heartbeat => {}
            other => log::debug!("Ignoring '{}' from the editor.", other.kind()),
        }
    }

    /// Enters play mode, logging failures.
    pub fn enter_play_mode(&mut self, is_paused: bool) {
        match self.play_mode.enter(&mut self.storage, is_paused) {
            Ok(true) => self
                .events
                .publish(EngineEvent::PlayModeChanged(self.play_mode.mode())),
            Ok(false) => {}
            Err(e) => log::error!("{e}"),
        }
    }

    /// Leaves play mode and sends the restored scene to the editor.
    pub fn exit_play_mode(&mut self) {
        match self.play_mode.exit(&mut self.storage) {
            Ok(true) => {
                self.events.publish(EngineEvent::PlayModeChanged(PlayMode::Edit));
                self.request_sync();
            }
            Ok(false) => {}
            Err(e) => log::error!("{e}"),
        }
    }

    /// Restores the edit scene if playing, tells the editor, and closes the link.
    pub fn shutdown(&mut self) {
        self.running = false;
        if self.play_mode.is_in_play_mode() {
            self.exit_play_mode();
        }
        if let Some(mut link) = self.link.take() {
            if let Err(e) = link.send(&SyncMessage::EngineShutdown) {
                log::debug!("Could not notify editor of shutdown: {e}");
            }
            link.shutdown();
        }
        log::info!("Engine shut down.");
    }

    fn change_property(
        &mut self,
        entity: EntityId,
        variant_type: &str,
        key_type: KeyType,
        key_path: &str,
        raw: &str,
    ) {
        let value = match key_type.parse(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Dropping change to {variant_type}.{key_path} on entity {entity}: {e}");
                return;
            }
        };
        match self.storage.update_property(entity, variant_type, key_path, value) {
            Ok(()) => log::trace!("Set {variant_type}.{key_path} = {raw} on entity {entity}."),
            Err(StorageError::UnknownEntity(_)) => {
                log::warn!("Property change for unknown entity {entity} dropped.")
            }
            Err(e) => log::warn!("Property change {variant_type}.{key_path} on {entity} failed: {e}"),
        }
    }

    fn scene_loaded(&mut self, entities: usize) {
        self.scene_ready = true;
        self.events.publish(EngineEvent::SceneLoaded { entities });
    }

    fn drain_link(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        for message in link.raise_events() {
            self.handle_message(message);
        }
    }

    fn frame_boundary(&mut self, delta_seconds: f32) {
        let Some(link) = self.link.as_ref() else {
            self.sync_requested = false;
            return;
        };

        if let Some(interval) = self.config.sync_interval_secs {
            self.since_sync += delta_seconds;
            if self.since_sync >= interval {
                self.since_sync = 0.0;
                self.sync_requested = true;
            }
        }
        if std::mem::take(&mut self.sync_requested) {
            let message = SyncMessage::scene(serialize_scene(&self.storage));
            if let Err(e) = link.send(&message) {
                log::error!("Failed to send scene snapshot: {e}");
            }
        }

        self.since_heartbeat += delta_seconds;
        if self.since_heartbeat >= self.config.heartbeat_interval_secs {
            self.since_heartbeat = 0.0;
            if let Err(e) = link.heartbeat() {
                log::debug!("Heartbeat failed: {e}");
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.link.is_some() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("play_mode", &self.play_mode.mode())
            .field("entities", &self.storage.len())
            .field("frame", &self.frame)
            .field("linked", &self.link.is_some())
            .finish_non_exhaustive()
    }
}
