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

//! Conversions between concrete property types and [`Value`].

use super::{ReflectError, TypeDescriptor, Value, ValueKind};
use crate::entity::EntityId;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// A type that can be carried through a reflected property.
///
/// Implemented here for atomic types and standard containers, and by
/// `#[derive(Reflect)]` for nested structs and field-less enums.
pub trait Reflect: Sized {
    /// The declared kind of this type.
    fn value_kind() -> ValueKind;

    /// Converts `self` into a dynamic value.
    fn to_value(&self) -> Value;

    /// Rebuilds an instance from a dynamic value.
    ///
    /// Numeric conversions are lenient across integer and float shapes but
    /// range checked.
    fn from_value(value: Value) -> Result<Self, ReflectError>;

    /// Takes over the persistent state of `fresh`.
    ///
    /// Derived structs keep their `no_serialize` members and recurse into
    /// the rest; every other type is replaced wholesale.
    fn absorb(&mut self, fresh: Self) {
        *self = fresh;
    }

    /// Converts `value` and absorbs it. `self` is untouched on error.
    fn assign_value(&mut self, value: Value) -> Result<(), ReflectError> {
        let fresh = Self::from_value(value)?;
        self.absorb(fresh);
        Ok(())
    }
}

/// A composite type with a registered [`TypeDescriptor`].
pub trait Reflected: Any {
    /// The unique name used on the wire and in files.
    const TYPE_NAME: &'static str;

    /// Builds the descriptor for this type.
    fn type_descriptor() -> TypeDescriptor;
}

/// Checked downcast used by generated property accessors.
pub fn downcast_instance<'a, T: Any>(
    instance: &'a dyn Any,
    type_name: &'static str,
) -> Result<&'a T, ReflectError> {
    instance
        .downcast_ref::<T>()
        .ok_or(ReflectError::WrongInstance(type_name))
}

/// Checked mutable downcast used by generated property accessors.
pub fn downcast_instance_mut<'a, T: Any>(
    instance: &'a mut dyn Any,
    type_name: &'static str,
) -> Result<&'a mut T, ReflectError> {
    instance
        .downcast_mut::<T>()
        .ok_or(ReflectError::WrongInstance(type_name))
}

fn mismatch(expected: &'static str, found: &Value) -> ReflectError {
    ReflectError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

fn integer_of(value: &Value) -> Result<i128, ReflectError> {
    value.as_i128().ok_or_else(|| mismatch("integer", value))
}

macro_rules! reflect_signed {
    ($($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn value_kind() -> ValueKind {
                    ValueKind::Integer
                }

                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self, ReflectError> {
                    let wide = integer_of(&value)?;
                    <$t>::try_from(wide).map_err(|_| ReflectError::OutOfRange {
                        value: wide.to_string(),
                        target: stringify!($t),
                    })
                }
            }
        )*
    };
}

macro_rules! reflect_unsigned {
    ($($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn value_kind() -> ValueKind {
                    ValueKind::Integer
                }

                fn to_value(&self) -> Value {
                    Value::UInt(*self as u64)
                }

                fn from_value(value: Value) -> Result<Self, ReflectError> {
                    let wide = integer_of(&value)?;
                    <$t>::try_from(wide).map_err(|_| ReflectError::OutOfRange {
                        value: wide.to_string(),
                        target: stringify!($t),
                    })
                }
            }
        )*
    };
}

reflect_signed!(i8, i16, i32, i64, isize);
reflect_unsigned!(u8, u16, u32, u64, usize);

impl Reflect for f32 {
    fn value_kind() -> ValueKind {
        ValueKind::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        let wide = value.as_f64().ok_or_else(|| mismatch("float", &value))?;
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(ReflectError::OutOfRange {
                value: wide.to_string(),
                target: "f32",
            });
        }
        Ok(narrow)
    }
}

impl Reflect for f64 {
    fn value_kind() -> ValueKind {
        ValueKind::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl Reflect for bool {
    fn value_kind() -> ValueKind {
        ValueKind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl Reflect for String {
    fn value_kind() -> ValueKind {
        ValueKind::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl Reflect for EntityId {
    fn value_kind() -> ValueKind {
        ValueKind::Integer
    }

    fn to_value(&self) -> Value {
        Value::UInt(self.0)
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        u64::from_value(value).map(EntityId)
    }
}

fn elements_of(value: Value) -> Result<Vec<Value>, ReflectError> {
    match value {
        Value::Sequence(items) | Value::Set(items) => Ok(items),
        other => Err(mismatch("sequence", &other)),
    }
}

/// Accepts either a native map or a sequence of `{key, value}` objects.
fn entries_of(value: Value) -> Result<Vec<(Value, Value)>, ReflectError> {
    match value {
        Value::Map(entries) => Ok(entries),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(members) => {
                    let mut key = None;
                    let mut entry_value = None;
                    for (name, member) in members {
                        match name.as_str() {
                            "key" => key = Some(member),
                            "value" => entry_value = Some(member),
                            _ => {}
                        }
                    }
                    match (key, entry_value) {
                        (Some(k), Some(v)) => Ok((k, v)),
                        _ => Err(ReflectError::TypeMismatch {
                            expected: "{key, value} entry",
                            found: "object",
                        }),
                    }
                }
                other => Err(mismatch("{key, value} entry", &other)),
            })
            .collect(),
        other => Err(mismatch("associative", &other)),
    }
}

fn convert_elements<T: Reflect>(items: Vec<Value>) -> impl Iterator<Item = Result<T, ReflectError>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| T::from_value(item).map_err(|e| e.in_member(format!("[{i}]"))))
}

fn convert_entries<K: Reflect, V: Reflect>(
    entries: Vec<(Value, Value)>,
) -> impl Iterator<Item = Result<(K, V), ReflectError>> {
    entries.into_iter().enumerate().map(|(i, (k, v))| {
        let key = K::from_value(k).map_err(|e| e.in_member(format!("[{i}].key")))?;
        let value = V::from_value(v).map_err(|e| e.in_member(format!("[{i}].value")))?;
        Ok((key, value))
    })
}

impl<T: Reflect> Reflect for Vec<T> {
    fn value_kind() -> ValueKind {
        ValueKind::Sequence(Box::new(T::value_kind()))
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        convert_elements(elements_of(value)?).collect()
    }
}

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn value_kind() -> ValueKind {
        ValueKind::Associative(Box::new(K::value_kind()), Box::new(V::value_kind()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        convert_entries(entries_of(value)?).collect()
    }
}

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn value_kind() -> ValueKind {
        ValueKind::Associative(Box::new(K::value_kind()), Box::new(V::value_kind()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        convert_entries(entries_of(value)?).collect()
    }
}

impl<K: Reflect + Ord> Reflect for BTreeSet<K> {
    fn value_kind() -> ValueKind {
        ValueKind::KeySet(Box::new(K::value_kind()))
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        convert_elements(elements_of(value)?).collect()
    }
}

impl<K: Reflect + Eq + Hash> Reflect for HashSet<K> {
    fn value_kind() -> ValueKind {
        ValueKind::KeySet(Box::new(K::value_kind()))
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ReflectError> {
        convert_elements(elements_of(value)?).collect()
    }
}
