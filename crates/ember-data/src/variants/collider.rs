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

use super::spatial::Vec2;
use ember_core::{Reflect, Variant};
use std::collections::BTreeSet;

/// Collision geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum ColliderShape {
    /// Axis-aligned box of `size`.
    #[default]
    Rectangle,
    /// Circle whose diameter is `size.x`.
    Circle,
}

/// Collision volume attached to an entity's position.
#[derive(Debug, Clone, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Collider {
    /// Geometry.
    pub shape: ColliderShape,
    /// Extent of the shape.
    pub size: Vec2,
    /// Layers this collider belongs to.
    pub layers: BTreeSet<u32>,
    /// Reports overlaps without blocking.
    pub is_trigger: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            shape: ColliderShape::Rectangle,
            size: Vec2::new(1.0, 1.0),
            layers: BTreeSet::from([0]),
            is_trigger: false,
        }
    }
}

impl Collider {
    /// True if both colliders share at least one layer.
    pub fn shares_layer(&self, other: &Collider) -> bool {
        !self.layers.is_disjoint(&other.layers)
    }
}

impl Variant for Collider {}
