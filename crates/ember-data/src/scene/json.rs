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

//! Mapping between reflected [`Value`] trees and JSON.

use ember_core::reflect::Value;
use serde_json::{Map, Number, Value as JsonValue};

/// Converts a reflected value to JSON.
///
/// Enums become their symbolic name (or their integer when unnamed),
/// associative containers become `[{"key": k, "value": v}, ...]` and
/// key-only sets become a bare array. Non-finite floats are rejected.
pub fn value_to_json(value: &Value) -> Result<JsonValue, String> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::UInt(u) => JsonValue::from(*u),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("{f} has no JSON representation"))?,
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Enum {
            name: Some(name), ..
        } => JsonValue::String(name.clone()),
        Value::Enum { name: None, value } => JsonValue::from(*value),
        Value::Object(members) => {
            let mut object = Map::new();
            for (name, member) in members {
                let converted = value_to_json(member).map_err(|e| format!("{name}: {e}"))?;
                object.insert(name.clone(), converted);
            }
            JsonValue::Object(object)
        }
        Value::Sequence(items) | Value::Set(items) => JsonValue::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => JsonValue::Array(
            entries
                .iter()
                .map(|(k, v)| -> Result<JsonValue, String> {
                    let mut entry = Map::new();
                    entry.insert("key".to_string(), value_to_json(k)?);
                    entry.insert("value".to_string(), value_to_json(v)?);
                    Ok(JsonValue::Object(entry))
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
    })
}

/// Converts JSON to a reflected value without type guidance.
///
/// Integers that fit `i64` become `Int`, larger ones `UInt`, everything
/// else numeric `Float`. Arrays become sequences; the property setters
/// reinterpret them as sets or `{key, value}` entry lists as needed.
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Sequence(items.iter().map(json_to_value).collect()),
        JsonValue::Object(members) => Value::Object(
            members
                .iter()
                .map(|(name, member)| (name.clone(), json_to_value(member)))
                .collect(),
        ),
    }
}
