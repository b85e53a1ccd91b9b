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

use ember_core::{Reflect, Variant, VariantContext};

/// A plain 2D vector, used as a nested property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// Builds a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// World-space location of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Variant for Position {}

/// Units per second. While playing, moves the sibling [`Position`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Velocity {
    /// Horizontal speed.
    pub x: f32,
    /// Vertical speed.
    pub y: f32,
}

impl Variant for Velocity {
    fn on_play_update(&mut self, ctx: &mut VariantContext<'_>) {
        let dt = ctx.delta_seconds();
        let (dx, dy) = (self.x * dt, self.y * dt);
        match ctx.get_mut::<Position>() {
            Some(position) => {
                position.x += dx;
                position.y += dy;
            }
            None => log::trace!("Entity {} has a Velocity but no Position.", ctx.entity()),
        }
    }
}

/// Per-axis scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Scale {
    /// Horizontal factor.
    pub x: f32,
    /// Vertical factor.
    pub y: f32,
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Variant for Scale {}
