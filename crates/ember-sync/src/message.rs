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

use crate::error::ProtocolError;
use ember_core::reflect::Value;
use ember_core::EntityId;
use ember_data::{EntityDocument, SceneDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Selects how the string value of a property delta is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// `"true"` or `"1"` is true, anything else false.
    Bool,
    /// Taken verbatim.
    String,
}

impl KeyType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Int => "int",
            KeyType::Float => "float",
            KeyType::Bool => "bool",
            KeyType::String => "string",
        }
    }

    /// Converts a raw value string.
    pub fn parse(&self, raw: &str) -> Result<Value, ProtocolError> {
        let invalid = || ProtocolError::InvalidValue {
            key_type: self.as_str(),
            raw: raw.to_string(),
        };
        match self {
            KeyType::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            KeyType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid()),
            KeyType::Bool => Ok(Value::Bool(matches!(raw, "true" | "1"))),
            KeyType::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a forwarded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Trace and debug output.
    Trace,
    /// Informational.
    Info,
    /// Something looks wrong.
    Warning,
    /// Something failed.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LogLevel::Trace,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Every notification exchanged between editor and engine.
///
/// All messages are one-way; there is no request/response pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    /// Full-state replace. Same shape as a scene document.
    Scene {
        /// Every entity. Malformed entries are dropped on decode.
        #[serde(deserialize_with = "ember_data::scene::entities_skipping_malformed")]
        entities: Vec<EntityDocument>,
    },
    /// Single-field delta.
    EntityPropertyChanged {
        /// Target entity.
        entity_id: EntityId,
        /// Target variant type.
        variant_type: String,
        /// How to read `value`.
        key_type: KeyType,
        /// Dotted property path.
        key_path: String,
        /// The new value, always a string.
        value: String,
    },
    /// Attach a default-constructed variant.
    EntityVariantAdded {
        /// Target entity, created if unseen.
        entity_id: EntityId,
        /// Type to construct.
        variant_type: String,
    },
    /// Soft-delete every variant of a type.
    EntityVariantRemoved {
        /// Target entity.
        entity_id: EntityId,
        /// Type to remove.
        variant_type: String,
    },
    /// Hard-delete an entity.
    EntityRemoved {
        /// Target entity.
        entity_id: EntityId,
    },
    /// Enter play mode.
    EnterPlayMode {
        /// Enter already paused.
        is_paused: bool,
    },
    /// Leave play mode and restore the edit scene.
    ExitPlayMode,
    /// Freeze play-mode updates.
    PausePlayMode,
    /// Resume play-mode updates.
    UnpausePlayMode,
    /// Handshake from the engine.
    EngineStarted,
    /// Handshake reply from the editor.
    EngineStartConfirmed,
    /// The engine is stopping.
    EngineShutdown,
    /// Liveness ping.
    #[serde(rename = "heartbeet")]
    Heartbeat,
    /// A forwarded log line.
    LogMessage {
        /// Severity.
        level: LogLevel,
        /// Rendered text.
        message: String,
    },
    /// The editor asks the engine to quit.
    Die,
}

impl SyncMessage {
    /// Every `type` this build understands.
    pub const KINDS: &'static [&'static str] = &[
        "scene",
        "entity_property_changed",
        "entity_variant_added",
        "entity_variant_removed",
        "entity_removed",
        "enter_play_mode",
        "exit_play_mode",
        "pause_play_mode",
        "unpause_play_mode",
        "engine_started",
        "engine_start_confirmed",
        "engine_shutdown",
        "heartbeet",
        "log_message",
        "die",
    ];

    /// Wire name of this message's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::Scene { .. } => "scene",
            SyncMessage::EntityPropertyChanged { .. } => "entity_property_changed",
            SyncMessage::EntityVariantAdded { .. } => "entity_variant_added",
            SyncMessage::EntityVariantRemoved { .. } => "entity_variant_removed",
            SyncMessage::EntityRemoved { .. } => "entity_removed",
            SyncMessage::EnterPlayMode { .. } => "enter_play_mode",
            SyncMessage::ExitPlayMode => "exit_play_mode",
            SyncMessage::PausePlayMode => "pause_play_mode",
            SyncMessage::UnpausePlayMode => "unpause_play_mode",
            SyncMessage::EngineStarted => "engine_started",
            SyncMessage::EngineStartConfirmed => "engine_start_confirmed",
            SyncMessage::EngineShutdown => "engine_shutdown",
            SyncMessage::Heartbeat => "heartbeet",
            SyncMessage::LogMessage { .. } => "log_message",
            SyncMessage::Die => "die",
        }
    }

    /// Wraps a scene document.
    pub fn scene(document: SceneDocument) -> Self {
        SyncMessage::Scene {
            entities: document.entities,
        }
    }

    /// Decodes one frame.
    ///
    /// A well-formed envelope with an unrecognised `type` yields
    /// [`ProtocolError::UnknownKind`]; anything else that fails to decode
    /// is [`ProtocolError::Malformed`].
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let json: JsonValue =
            serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        let kind = json
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ProtocolError::Malformed("missing string field 'type'".to_string()))?;
        if !Self::KINDS.contains(&kind) {
            return Err(ProtocolError::UnknownKind(kind.to_string()));
        }
        serde_json::from_value(json).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Encodes as compact JSON.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
