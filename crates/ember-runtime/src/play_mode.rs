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

//! Edit / play / pause state machine.
//!
//! Entering play mode snapshots the store; leaving it throws away every
//! change made while playing and reloads the snapshot.

use crate::error::PlayModeError;
use ember_data::scene::{apply_scene, SceneDocument, SceneError};
use ember_data::{serialize_scene, Phase, Storage};

/// Whether the simulation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayMode {
    /// Static, inspectable scene.
    #[default]
    Edit,
    /// Play hooks run every frame.
    Playing,
    /// In play mode, but play hooks are frozen.
    Paused,
}

/// Owns the current [`PlayMode`] and the edit-scene backup.
#[derive(Debug, Default)]
pub struct PlayModeController {
    mode: PlayMode,
    backup: Option<String>,
}

impl PlayModeController {
    /// Starts in [`PlayMode::Edit`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// True while playing or paused.
    pub fn is_in_play_mode(&self) -> bool {
        self.mode != PlayMode::Edit
    }

    /// True if a backup is held.
    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Enters play mode, snapshotting the store first.
    ///
    /// Dead variants are collected before the snapshot. Returns `false`
    /// without touching anything if already in play mode.
    pub fn enter(&mut self, storage: &mut Storage, is_paused: bool) -> Result<bool, PlayModeError> {
        if self.is_in_play_mode() {
            log::debug!("Already in play mode.");
            return Ok(false);
        }

        storage.garbage_collect();
        let snapshot =
            serde_json::to_string(&serialize_scene(storage)).map_err(PlayModeError::Snapshot)?;
        self.backup = Some(snapshot);
        storage.reset_play_flags();
        self.mode = if is_paused {
            PlayMode::Paused
        } else {
            PlayMode::Playing
        };
        log::info!("Entered play mode ({:?}).", self.mode);
        Ok(true)
    }

    /// Leaves play mode and restores the edit scene.
    ///
    /// Returns `false` if not in play mode. If the backup cannot be
    /// restored, the store, the backup and the mode are left as they were.
    ///
    /// # Panics
    ///
    /// Panics if in play mode without a backup, which can only happen if
    /// the controller's own bookkeeping is broken.
    pub fn exit(&mut self, storage: &mut Storage) -> Result<bool, PlayModeError> {
        if !self.is_in_play_mode() {
            log::warn!("Exit requested outside play mode; ignoring.");
            return Ok(false);
        }

        let Some(backup) = self.backup.as_deref() else {
            panic!("play mode is active but no edit-scene backup exists");
        };
        let document: SceneDocument = serde_json::from_str(backup).map_err(SceneError::from)?;
        apply_scene(storage, &document)?;
        storage.reset_play_flags();
        self.backup = None;
        self.mode = PlayMode::Edit;
        log::info!("Exited play mode; edit scene restored.");
        Ok(true)
    }

    /// Freezes play hooks. Returns whether the mode changed.
    pub fn pause(&mut self) -> bool {
        match self.mode {
            PlayMode::Playing => {
                self.mode = PlayMode::Paused;
                log::info!("Play mode paused.");
                true
            }
            PlayMode::Paused => false,
            PlayMode::Edit => {
                log::warn!("Pause requested outside play mode; ignoring.");
                false
            }
        }
    }

    /// Resumes play hooks. Returns whether the mode changed.
    pub fn unpause(&mut self) -> bool {
        match self.mode {
            PlayMode::Paused => {
                self.mode = PlayMode::Playing;
                log::info!("Play mode resumed.");
                true
            }
            PlayMode::Playing => false,
            PlayMode::Edit => {
                log::warn!("Unpause requested outside play mode; ignoring.");
                false
            }
        }
    }

    /// Runs play-start, play-late-start and play-update while playing.
    pub fn run_play_phases(&self, storage: &mut Storage) {
        if self.mode != PlayMode::Playing {
            return;
        }
        for phase in Phase::PLAY {
            storage.run_phase(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_data::builtin_registry;
    use ember_data::variants::{Position, Velocity};
    use std::sync::Arc;

    fn storage_with_mover() -> (Storage, ember_core::EntityId) {
        let mut storage = Storage::new(Arc::new(builtin_registry()));
        let entity = storage.create_entity();
        storage.attach(entity, Position::default());
        storage.attach(entity, Velocity { x: 1.0, y: 0.0 });
        storage.set_delta_seconds(1.0);
        (storage, entity)
    }

    #[test]
    fn enter_twice_keeps_the_first_backup() {
        let (mut storage, entity) = storage_with_mover();
        let mut controller = PlayModeController::new();

        assert!(controller.enter(&mut storage, false).unwrap());
        controller.run_play_phases(&mut storage);
        assert!(!controller.enter(&mut storage, false).unwrap());
        controller.exit(&mut storage).unwrap();

        assert_eq!(storage.get_variant::<Position>(entity).unwrap().x, 0.0);
    }

    #[test]
    fn paused_mode_skips_play_phases() {
        let (mut storage, entity) = storage_with_mover();
        let mut controller = PlayModeController::new();

        controller.enter(&mut storage, true).unwrap();
        controller.run_play_phases(&mut storage);
        assert_eq!(storage.get_variant::<Position>(entity).unwrap().x, 0.0);

        assert!(controller.unpause());
        controller.run_play_phases(&mut storage);
        assert_eq!(storage.get_variant::<Position>(entity).unwrap().x, 1.0);
    }

    #[test]
    fn transitions_outside_play_mode_are_ignored() {
        let (mut storage, _) = storage_with_mover();
        let mut controller = PlayModeController::new();

        assert!(!controller.pause());
        assert!(!controller.unpause());
        assert!(!controller.exit(&mut storage).unwrap());
        assert_eq!(controller.mode(), PlayMode::Edit);
    }

    #[test]
    fn exit_rearms_play_start() {
        let (mut storage, _) = storage_with_mover();
        let mut controller = PlayModeController::new();

        controller.enter(&mut storage, false).unwrap();
        controller.run_play_phases(&mut storage);
        assert!(storage.is_started());
        controller.exit(&mut storage).unwrap();

        assert!(!storage.is_started());
        assert!(!controller.has_backup());
    }

    #[test]
    fn failed_restore_keeps_store_and_backup() {
        let (mut storage, entity) = storage_with_mover();
        let mut controller = PlayModeController {
            mode: PlayMode::Playing,
            backup: Some("{not a scene".to_string()),
        };

        let result = controller.exit(&mut storage);

        assert!(matches!(result, Err(PlayModeError::Restore(_))));
        assert_eq!(controller.mode(), PlayMode::Playing);
        assert!(controller.has_backup());
        assert!(storage.get_variant::<Position>(entity).is_some());
    }

    #[test]
    fn wrong_kind_backup_is_not_applied() {
        let (mut storage, entity) = storage_with_mover();
        let mut controller = PlayModeController {
            mode: PlayMode::Paused,
            backup: Some(r#"{"type": "entity", "entities": []}"#.to_string()),
        };

        assert!(controller.exit(&mut storage).is_err());
        assert!(controller.is_in_play_mode());
        assert_eq!(storage.variants(entity).len(), 2);
    }

    #[test]
    #[should_panic(expected = "no edit-scene backup")]
    fn exit_without_backup_is_fatal() {
        let (mut storage, _) = storage_with_mover();
        let mut controller = PlayModeController {
            mode: PlayMode::Playing,
            backup: None,
        };

        let _ = controller.exit(&mut storage);
    }
}
