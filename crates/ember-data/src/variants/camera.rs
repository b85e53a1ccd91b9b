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

/// The view into the world.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Camera2D {
    /// Offset from the entity's position.
    pub offset: Vec2,
    /// Magnification; 1 is unscaled.
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            offset: Vec2::default(),
            zoom: 1.0,
        }
    }
}

impl Variant for Camera2D {}
