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

use ember_core::EntityId;
use ember_data::builtin_registry;
use ember_data::scene::{VariantDocument, VariantLibrary};
use ember_data::variants::{Position, Velocity};
use ember_editor::{EditorError, EditorSession, PlayState};
use ember_runtime::{Engine, EngineConfig, PlayMode};
use ember_sync::transport::memory;
use ember_sync::{KeyType, Role, SyncEndpoint};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn library() -> VariantLibrary {
    let mut library = VariantLibrary::new();
    library.insert_template(VariantDocument {
        type_name: "Position".to_string(),
        value: json!({"x": 2.0, "y": 3.0}).as_object().cloned().unwrap(),
    });
    library.insert_template(VariantDocument {
        type_name: "Velocity".to_string(),
        value: json!({"x": 1.0, "y": 0.0}).as_object().cloned().unwrap(),
    });
    library.set_requires("Velocity", vec!["Position".to_string()]);
    library
}

/// An editor session and an engine joined by an in-memory link, handshake done.
fn connected() -> (EditorSession, Engine) {
    let (editor_link, engine_link) = memory::pair();
    let editor = SyncEndpoint::start(Role::Editor, editor_link).unwrap();
    let mut session = EditorSession::new(editor, library());

    let mut engine_side = SyncEndpoint::start(Role::Engine, engine_link).unwrap();
    let announcer = std::thread::spawn(move || {
        let confirmed = engine_side.announce(50, Duration::from_millis(20), None);
        (engine_side, confirmed)
    });
    let deadline = Instant::now() + Duration::from_secs(2);
    while !session.is_engine_alive(Duration::from_secs(5)) && Instant::now() < deadline {
        session.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
    let (engine_side, confirmed) = announcer.join().unwrap();
    assert!(confirmed);

    let engine = Engine::new(EngineConfig::default(), Arc::new(builtin_registry())).with_link(engine_side);
    (session, engine)
}

/// Runs engine frames until `pred` holds or a second passes.
fn run_until(engine: &mut Engine, pred: impl Fn(&Engine) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        engine.run_frame(0.0);
        if pred(engine) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

fn engine_x(engine: &Engine, entity: EntityId) -> Option<f32> {
    engine.storage().get_variant::<Position>(entity).map(|p| p.x)
}

#[test]
fn added_template_and_property_edit_reach_the_engine() {
    // --- 1. ARRANGE ---
    let (mut session, mut engine) = connected();
    let entity = session.create_entity();

    // --- 2. ACT ---
    let attached = session.add_variant(entity, "Position").unwrap();
    let seeded = run_until(&mut engine, |e| engine_x(e, entity) == Some(2.0));
    session
        .set_property(entity, "Position", "x", KeyType::Float, "7.5")
        .unwrap();
    let edited = run_until(&mut engine, |e| engine_x(e, entity) == Some(7.5));

    // --- 3. ASSERT ---
    assert_eq!(attached, vec!["Position".to_string()]);
    assert!(seeded, "template values should follow the variant");
    assert!(edited, "property edit should be applied");
    let mirror = session.entity(entity).unwrap().variant("Position").unwrap();
    assert_eq!(mirror.value["x"], json!(7.5));
    assert_eq!(engine.storage().get_variant::<Position>(entity).unwrap().y, 3.0);
}

#[test]
fn required_variants_are_attached_alongside() {
    // --- 1. ARRANGE ---
    let (mut session, mut engine) = connected();
    let entity = session.create_entity();

    // --- 2. ACT ---
    let attached = session.add_variant(entity, "Velocity").unwrap();
    let arrived = run_until(&mut engine, |e| {
        e.storage().has_variant(entity, "Velocity") && e.storage().has_variant(entity, "Position")
    });

    // --- 3. ASSERT ---
    assert_eq!(attached, vec!["Velocity".to_string(), "Position".to_string()]);
    assert!(arrived);
    assert_eq!(engine.storage().get_variant::<Velocity>(entity).unwrap().x, 1.0);
}

#[test]
fn leaving_play_mode_restores_the_mirror() {
    // --- 1. ARRANGE ---
    let (mut session, mut engine) = connected();
    let entity = session.create_entity();
    session.add_variant(entity, "Position").unwrap();
    assert!(run_until(&mut engine, |e| engine_x(e, entity) == Some(2.0)));

    // --- 2. ACT ---
    session.enter_play_mode(false).unwrap();
    assert!(run_until(&mut engine, |e| e.play_mode() == PlayMode::Playing));
    session
        .set_property(entity, "Position", "x", KeyType::Float, "9")
        .unwrap();
    assert!(run_until(&mut engine, |e| engine_x(e, entity) == Some(9.0)));
    session.exit_play_mode().unwrap();
    assert!(run_until(&mut engine, |e| e.play_mode() == PlayMode::Edit));

    let deadline = Instant::now() + Duration::from_secs(1);
    let restored = loop {
        engine.run_frame(0.0);
        session.pump();
        let x = session.entity(entity).and_then(|e| e.variant("Position")).map(|v| v.value["x"].clone());
        if x == Some(json!(2.0)) || Instant::now() > deadline {
            break x;
        }
        std::thread::sleep(Duration::from_millis(5));
    };

    // --- 3. ASSERT ---
    assert_eq!(restored, Some(json!(2.0)));
    assert_eq!(engine_x(&engine, entity), Some(2.0));
    assert_eq!(session.play_state(), PlayState::Edit);
}

#[test]
fn killing_the_engine_is_observed_by_the_session() {
    // --- 1. ARRANGE ---
    let (mut session, mut engine) = connected();

    // --- 2. ACT ---
    session.kill_engine().unwrap();
    assert!(run_until(&mut engine, |e| !e.is_running()));
    engine.shutdown();
    let deadline = Instant::now() + Duration::from_secs(1);
    while session.is_engine_alive(Duration::from_secs(5)) && Instant::now() < deadline {
        session.pump();
        std::thread::sleep(Duration::from_millis(5));
    }

    // --- 3. ASSERT ---
    assert!(!session.is_engine_alive(Duration::from_secs(5)));
}

#[test]
fn edits_on_missing_targets_are_rejected_locally() {
    // --- 1. ARRANGE ---
    let (mut session, _engine) = connected();
    let entity = session.create_entity();

    // --- 2. ACT ---
    let no_entity = session.set_property(EntityId(99), "Position", "x", KeyType::Float, "1");
    let no_variant = session.set_property(entity, "Position", "x", KeyType::Float, "1");
    session.add_variant(entity, "Position").unwrap();
    let bad_value = session.set_property(entity, "Position", "x", KeyType::Float, "fast");
    let no_removal = session.remove_variant(entity, "Sprite");

    // --- 3. ASSERT ---
    assert!(matches!(no_entity, Err(EditorError::UnknownEntity(EntityId(99)))));
    assert!(matches!(no_variant, Err(EditorError::UnknownVariant { .. })));
    assert!(matches!(bad_value, Err(EditorError::Protocol(_))));
    assert!(matches!(no_removal, Err(EditorError::UnknownVariant { .. })));
}

#[test]
fn scene_files_round_trip_through_the_mirror() {
    // --- 1. ARRANGE ---
    let (mut session, _engine) = connected();
    let entity = session.create_entity();
    session.add_variant(entity, "Velocity").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("level.scene");

    // --- 2. ACT ---
    session.save_scene(&path).unwrap();
    session.remove_entity(entity).unwrap();
    let emptied = session.scene().entities.is_empty();
    session.load_scene(&path).unwrap();

    // --- 3. ASSERT ---
    assert!(emptied);
    let reloaded = session.entity(entity).unwrap();
    assert_eq!(reloaded.variants.len(), 2);
    assert_eq!(reloaded.variant("Velocity").unwrap().value["x"], json!(1.0));
}
