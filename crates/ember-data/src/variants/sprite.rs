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

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// A textured quad drawn at the entity's position.
///
/// The texture is (re)loaded whenever `path_to_sprite` is set, whether by a
/// scene load or an editor edit.
#[derive(Debug, Clone, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Sprite {
    /// Texture file, relative to the resource directory.
    #[reflect(on_set = "reload_texture")]
    pub path_to_sprite: String,
    /// Multiplied with the texture.
    pub tint: Color,
    /// 0 is invisible, 1 is opaque.
    pub opacity: f32,
    /// Path of the texture currently loaded. Runtime state only.
    #[reflect(no_serialize)]
    pub loaded_path: String,
    #[reflect(skip)]
    reloads: u32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            path_to_sprite: String::new(),
            tint: Color::WHITE,
            opacity: 1.0,
            loaded_path: String::new(),
            reloads: 0,
        }
    }
}

impl Sprite {
    /// Loads the texture named by `path_to_sprite`.
    pub fn reload_texture(&mut self) {
        if self.path_to_sprite == self.loaded_path {
            return;
        }
        log::debug!("Loading sprite texture '{}'.", self.path_to_sprite);
        self.loaded_path = self.path_to_sprite.clone();
        self.reloads += 1;
    }

    /// How many times a texture was actually (re)loaded.
    pub fn reload_count(&self) -> u32 {
        self.reloads
    }
}

impl Variant for Sprite {
    fn on_init(&mut self, _ctx: &mut VariantContext<'_>) {
        self.reload_texture();
    }
}
