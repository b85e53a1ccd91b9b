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

//! Dotted-path property updates.

use super::PathError;
use ember_core::reflect::{TypeDescriptor, Value};
use std::any::Any;

/// Splits `a.b.c` into its segments, rejecting empty ones.
pub fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PathError::Invalid(path.to_string()));
    }
    Ok(segments)
}

/// Sets the value addressed by `path` on `instance`.
///
/// The first segment names a top-level property. Further segments walk
/// into nested objects (by member name) or sequences (by index) of a copy
/// of that property, which is then written back as a whole so the
/// property's `on_set` callback still runs.
pub fn update_property_path(
    descriptor: &TypeDescriptor,
    instance: &mut dyn Any,
    path: &str,
    value: Value,
) -> Result<(), PathError> {
    let segments = split_path(path)?;
    let Some((root, rest)) = segments.split_first() else {
        return Err(PathError::Invalid(path.to_string()));
    };

    if rest.is_empty() {
        descriptor.set(instance, root, value)?;
        return Ok(());
    }

    let mut current = descriptor.get(instance, root)?;
    *descend(&mut current, rest)? = value;
    descriptor.set(instance, root, current)?;
    Ok(())
}

fn descend<'v>(value: &'v mut Value, segments: &[&str]) -> Result<&'v mut Value, PathError> {
    let mut cursor = value;
    for segment in segments {
        cursor = match cursor {
            Value::Object(members) => members
                .iter_mut()
                .find(|(name, _)| name == segment)
                .map(|(_, member)| member)
                .ok_or_else(|| PathError::MissingMember {
                    segment: segment.to_string(),
                })?,
            Value::Sequence(items) => {
                let index: usize = segment.parse().map_err(|_| PathError::MissingMember {
                    segment: segment.to_string(),
                })?;
                items.get_mut(index).ok_or_else(|| PathError::MissingMember {
                    segment: segment.to_string(),
                })?
            }
            other => {
                return Err(PathError::NotTraversable {
                    segment: segment.to_string(),
                    found: other.kind_name(),
                })
            }
        };
    }
    Ok(cursor)
}
