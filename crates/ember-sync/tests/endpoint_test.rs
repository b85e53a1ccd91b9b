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
use ember_sync::transport::memory;
use ember_sync::{ConnectionState, KeyType, ProtocolError, Role, SyncEndpoint, SyncMessage};
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// Polls `raise_events` until `count` messages arrived or a second passed.
fn drain(endpoint: &mut SyncEndpoint, count: usize) -> Vec<SyncMessage> {
    let deadline = Instant::now() + Duration::from_secs(1);
    let mut messages = Vec::new();
    while messages.len() < count && Instant::now() < deadline {
        messages.extend(endpoint.raise_events());
        std::thread::sleep(Duration::from_millis(5));
    }
    messages
}

#[test]
fn malformed_frame_is_dropped_and_draining_continues() {
    // --- 1. ARRANGE ---
    let (editor_link, engine_link) = memory::pair();
    let mut engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();
    let first = SyncMessage::EntityRemoved {
        entity_id: EntityId(1),
    };
    let second = SyncMessage::EnterPlayMode { is_paused: false };

    // --- 2. ACT ---
    editor_link.sender.send(&first.encode().unwrap()).unwrap();
    editor_link.sender.send("{\"type\": \"entity_removed\"").unwrap();
    editor_link.sender.send(r#"{"type": "entity_removed"}"#).unwrap();
    editor_link.sender.send(r#"{"type": "window_state"}"#).unwrap();
    editor_link.sender.send(&second.encode().unwrap()).unwrap();
    let messages = drain(&mut engine, 2);

    // --- 3. ASSERT ---
    assert_eq!(messages, vec![first, second]);
}

#[test]
fn decode_separates_unknown_kinds_from_malformed_frames() {
    // --- 1. ARRANGE ---
    let frames = [
        "not json",
        r#"{"entity_id": 3}"#,
        r#"{"type": "entity_property_changed", "entity_id": 3}"#,
        r#"{"type": "teleport"}"#,
    ];

    // --- 2. ACT ---
    let results: Vec<_> = frames.iter().map(|f| SyncMessage::decode(f)).collect();

    // --- 3. ASSERT ---
    assert!(matches!(results[0], Err(ProtocolError::Malformed(_))));
    assert!(matches!(results[1], Err(ProtocolError::Malformed(_))));
    assert!(matches!(results[2], Err(ProtocolError::Malformed(_))));
    assert!(matches!(results[3], Err(ProtocolError::UnknownKind(ref k)) if k == "teleport"));
}

#[test]
fn property_change_uses_the_documented_wire_shape() {
    // --- 1. ARRANGE ---
    let frame = r#"{"type":"entity_property_changed","entity_id":7,"variant_type":"Position","key_type":"float","key_path":"x","value":"5.0"}"#;

    // --- 2. ACT ---
    let message = SyncMessage::decode(frame).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        message,
        SyncMessage::EntityPropertyChanged {
            entity_id: EntityId(7),
            variant_type: "Position".to_string(),
            key_type: KeyType::Float,
            key_path: "x".to_string(),
            value: "5.0".to_string(),
        }
    );
    assert_eq!(message.encode().unwrap(), frame);
}

#[test]
fn heartbeat_keeps_its_wire_spelling() {
    // --- 1. ARRANGE / 2. ACT ---
    let frame = SyncMessage::Heartbeat.encode().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(frame, r#"{"type":"heartbeet"}"#);
    assert_eq!(SyncMessage::decode(&frame).unwrap(), SyncMessage::Heartbeat);
}

#[test]
fn handshake_connects_both_sides() {
    // --- 1. ARRANGE ---
    let (editor_link, engine_link) = memory::pair();
    let mut editor = SyncEndpoint::start(Role::Editor, editor_link).unwrap();
    let mut engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();
    let cancel = AtomicBool::new(false);

    // --- 2. ACT ---
    let editor_thread = std::thread::spawn(move || {
        let seen = drain(&mut editor, 1);
        (editor, seen)
    });
    let confirmed = engine.announce(20, Duration::from_millis(50), Some(&cancel));
    let (editor, seen) = editor_thread.join().unwrap();

    // --- 3. ASSERT ---
    assert!(confirmed);
    assert_eq!(engine.state(), ConnectionState::Connected);
    assert_eq!(editor.state(), ConnectionState::Connected);
    assert_eq!(seen.first(), Some(&SyncMessage::EngineStarted));
    assert_eq!(
        engine.raise_events().first(),
        Some(&SyncMessage::EngineStartConfirmed)
    );
}

#[test]
fn announce_gives_up_without_an_editor() {
    // --- 1. ARRANGE ---
    let (_editor_link, engine_link) = memory::pair();
    let mut engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();

    // --- 2. ACT ---
    let confirmed = engine.announce(3, Duration::from_millis(10), None);

    // --- 3. ASSERT ---
    assert!(!confirmed);
    assert_eq!(engine.state(), ConnectionState::Connecting);
}

#[test]
fn heartbeats_are_recorded() {
    // --- 1. ARRANGE ---
    let (editor_link, engine_link) = memory::pair();
    let mut editor = SyncEndpoint::start(Role::Editor, editor_link).unwrap();
    let engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();

    // --- 2. ACT ---
    engine.heartbeat().unwrap();
    let messages = drain(&mut editor, 1);

    // --- 3. ASSERT ---
    assert_eq!(messages, vec![SyncMessage::Heartbeat]);
    assert!(editor.last_heartbeat().is_some());
}

#[test]
fn shutdown_discards_undrained_frames_and_stops_sending() {
    // --- 1. ARRANGE ---
    let (editor_link, engine_link) = memory::pair();
    let mut engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();
    editor_link.sender.send(r#"{"type":"die"}"#).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    // --- 2. ACT ---
    engine.shutdown();

    // --- 3. ASSERT ---
    assert!(engine.raise_events().is_empty());
    assert_eq!(engine.state(), ConnectionState::Disconnected);
    assert!(engine.heartbeat().is_err());
    assert!(!engine.is_link_open());
}

#[test]
fn dropped_peer_closes_the_link() {
    // --- 1. ARRANGE ---
    let (editor_link, engine_link) = memory::pair();
    let engine = SyncEndpoint::start(Role::Engine, engine_link).unwrap();

    // --- 2. ACT ---
    drop(editor_link);
    let deadline = Instant::now() + Duration::from_secs(1);
    while engine.is_link_open() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }

    // --- 3. ASSERT ---
    assert!(!engine.is_link_open());
}
