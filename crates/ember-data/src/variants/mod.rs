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

//! Engine-level components shipped with every build.
//!
//! Gameplay components live with the game; these cover placement, motion,
//! naming, drawing and collision.

mod camera;
mod collider;
mod spatial;
mod sprite;
mod tag;

pub use camera::Camera2D;
pub use collider::{Collider, ColliderShape};
pub use spatial::{Position, Scale, Vec2, Velocity};
pub use sprite::{Color, Sprite};
pub use tag::Tag;

use ember_core::reflect::{Reflected, RegistryError, TypeDescriptor, TypeRegistry};

/// Built-in requirement lists, `(owner, required types)`.
pub const BUILTIN_REQUIRES: &[(&str, &[&str])] = &[
    (Velocity::TYPE_NAME, &[Position::TYPE_NAME]),
    (Collider::TYPE_NAME, &[Position::TYPE_NAME]),
];

fn builtin_descriptors() -> Vec<TypeDescriptor> {
    vec![
        Vec2::type_descriptor(),
        Color::type_descriptor(),
        Position::type_descriptor(),
        Velocity::type_descriptor(),
        Scale::type_descriptor(),
        Tag::type_descriptor(),
        Sprite::type_descriptor(),
        Collider::type_descriptor(),
        Camera2D::type_descriptor(),
    ]
}

/// Every statically registered type, built-ins guaranteed.
pub fn builtin_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::from_inventory();
    for descriptor in builtin_descriptors() {
        match registry.register(descriptor) {
            Ok(()) | Err(RegistryError::DuplicateType(_)) => {}
            Err(e) => log::error!("Failed to register built-in type: {e}"),
        }
    }
    registry
}
