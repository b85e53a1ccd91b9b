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

//! The dynamic value tree exchanged between typed code and reflection.

use std::fmt;

/// A type-erased property value.
///
/// Objects keep their members in declaration order. Associative containers
/// are kept as ordered key/value pairs so that any key type can be carried.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An enumerator, by symbolic name when one is known.
    Enum {
        /// Symbolic name of the enumerator.
        name: Option<String>,
        /// Underlying integer value.
        value: i64,
    },
    /// A nested object as ordered `(member, value)` pairs.
    Object(Vec<(String, Value)>),
    /// An ordered sequence.
    Sequence(Vec<Value>),
    /// An associative container.
    Map(Vec<(Value, Value)>),
    /// A key-only container.
    Set(Vec<Value>),
}

impl Value {
    /// A short lowercase name for the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum { .. } => "enum",
            Value::Object(_) => "object",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "associative",
            Value::Set(_) => "set",
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns an integral value widened to `i128`.
    ///
    /// Floats qualify only when they are finite and have no fractional part.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(i128::from(*i)),
            Value::UInt(u) => Some(i128::from(*u)),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i128),
            Value::Enum { value, .. } => Some(i128::from(*value)),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a member of an object value.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Looks up a member of an object value for modification.
    pub fn member_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Object(members) => members
                .iter_mut()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// The declared kind of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// `bool`.
    Bool,
    /// Any fixed-size integer.
    Integer,
    /// `f32` or `f64`.
    Float,
    /// `String`.
    String,
    /// A field-less enum, by type name.
    Enum(&'static str),
    /// A nested reflected struct, by type name.
    Object(&'static str),
    /// An ordered container of elements.
    Sequence(Box<ValueKind>),
    /// A key/value container.
    Associative(Box<ValueKind>, Box<ValueKind>),
    /// A key-only container.
    KeySet(Box<ValueKind>),
}

impl ValueKind {
    /// Returns true for bool, integer, float, string, and enum kinds.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            ValueKind::Bool | ValueKind::Integer | ValueKind::Float | ValueKind::String | ValueKind::Enum(_)
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Enum(name) => write!(f, "enum {name}"),
            ValueKind::Object(name) => write!(f, "object {name}"),
            ValueKind::Sequence(element) => write!(f, "sequence<{element}>"),
            ValueKind::Associative(key, value) => write!(f, "associative<{key}, {value}>"),
            ValueKind::KeySet(key) => write!(f, "set<{key}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_widens_to_integer() {
        assert_eq!(Value::Float(3.0).as_i128(), Some(3));
        assert_eq!(Value::Float(3.5).as_i128(), None);
        assert_eq!(Value::Float(f64::NAN).as_i128(), None);
    }

    #[test]
    fn member_lookup_on_object() {
        let mut value = Value::Object(vec![
            ("x".to_string(), Value::Float(1.0)),
            ("y".to_string(), Value::Float(2.0)),
        ]);

        assert_eq!(value.member("y"), Some(&Value::Float(2.0)));
        *value.member_mut("x").unwrap() = Value::Float(9.0);
        assert_eq!(value.member("x"), Some(&Value::Float(9.0)));
        assert_eq!(value.member("z"), None);
    }

    #[test]
    fn kind_display_is_nested() {
        let kind = ValueKind::Associative(
            Box::new(ValueKind::String),
            Box::new(ValueKind::Sequence(Box::new(ValueKind::Integer))),
        );
        assert_eq!(kind.to_string(), "associative<string, sequence<integer>>");
    }
}
