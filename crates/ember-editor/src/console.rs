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

//! Line commands for driving a session from a terminal.

use crate::error::EditorError;
use crate::session::EditorSession;
use ember_core::EntityId;
use ember_sync::KeyType;
use std::path::PathBuf;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `play [paused]`
    Play { paused: bool },
    /// `stop`
    Stop,
    /// `pause`
    Pause,
    /// `unpause`
    Unpause,
    /// `new`
    NewEntity,
    /// `add <entity> <prefab>`
    Add { entity: EntityId, prefab: String },
    /// `set <entity> <variant> <int|float|bool|string> <key.path> <value...>`
    Set {
        entity: EntityId,
        variant: String,
        key_type: KeyType,
        key_path: String,
        value: String,
    },
    /// `remove <entity> [variant]`
    Remove {
        entity: EntityId,
        variant: Option<String>,
    },
    /// `push`
    Push,
    /// `save <file>`
    Save(PathBuf),
    /// `load <file>`
    Load(PathBuf),
    /// `kill`
    Kill,
    /// `quit`
    Quit,
}

impl Command {
    /// Parses one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let command = match verb {
            "play" => Command::Play {
                paused: words.next() == Some("paused"),
            },
            "stop" => Command::Stop,
            "pause" => Command::Pause,
            "unpause" => Command::Unpause,
            "new" => Command::NewEntity,
            "add" => Command::Add {
                entity: entity_arg(words.next())?,
                prefab: word_arg(words.next(), "prefab")?,
            },
            "set" => {
                let entity = entity_arg(words.next())?;
                let variant = word_arg(words.next(), "variant")?;
                let key_type = match words.next() {
                    Some("int") => KeyType::Int,
                    Some("float") => KeyType::Float,
                    Some("bool") => KeyType::Bool,
                    Some("string") => KeyType::String,
                    other => return Err(format!("unknown key type {other:?}")),
                };
                let key_path = word_arg(words.next(), "key path")?;
                let value = words.collect::<Vec<_>>().join(" ");
                Command::Set {
                    entity,
                    variant,
                    key_type,
                    key_path,
                    value,
                }
            }
            "remove" => Command::Remove {
                entity: entity_arg(words.next())?,
                variant: words.next().map(str::to_string),
            },
            "push" => Command::Push,
            "save" => Command::Save(word_arg(words.next(), "file")?.into()),
            "load" => Command::Load(word_arg(words.next(), "file")?.into()),
            "kill" => Command::Kill,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(Some(command))
    }

    /// Runs the command against `session`.
    pub fn apply(self, session: &mut EditorSession) -> Result<(), EditorError> {
        match self {
            Command::Play { paused } => session.enter_play_mode(paused),
            Command::Stop => session.exit_play_mode(),
            Command::Pause => session.pause(),
            Command::Unpause => session.unpause(),
            Command::NewEntity => {
                let id = session.create_entity();
                log::info!("Created entity {id}.");
                Ok(())
            }
            Command::Add { entity, prefab } => {
                let attached = session.add_variant(entity, &prefab)?;
                log::info!("Attached {attached:?} to entity {entity}.");
                Ok(())
            }
            Command::Set {
                entity,
                variant,
                key_type,
                key_path,
                value,
            } => session.set_property(entity, &variant, &key_path, key_type, &value),
            Command::Remove {
                entity,
                variant: Some(variant),
            } => session.remove_variant(entity, &variant),
            Command::Remove {
                entity,
                variant: None,
            } => session.remove_entity(entity),
            Command::Push => session.push_scene(),
            Command::Save(path) => session.save_scene(&path),
            Command::Load(path) => {
                session.load_scene(&path)?;
                session.push_scene()
            }
            Command::Kill => session.kill_engine(),
            Command::Quit => Ok(()),
        }
    }
}

fn word_arg(word: Option<&str>, what: &str) -> Result<String, String> {
    word.map(str::to_string).ok_or_else(|| format!("missing {what}"))
}

fn entity_arg(word: Option<&str>) -> Result<EntityId, String> {
    let word = word.ok_or("missing entity id")?;
    word.parse::<u64>()
        .map(EntityId)
        .map_err(|_| format!("'{word}' is not an entity id"))
}
