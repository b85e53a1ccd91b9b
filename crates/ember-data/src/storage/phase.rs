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

use ember_core::{Variant, VariantContext};

/// A lifecycle pass over every live variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `on_post_init`, at most once per variant ever.
    PostInit,
    /// `on_update`, every frame.
    Update,
    /// `on_play_start`, once per play session.
    PlayStart,
    /// `on_play_late_start`, once per play session.
    PlayLateStart,
    /// `on_play_update`, every frame while playing.
    PlayUpdate,
}

impl Phase {
    /// The phases run every frame in edit and play mode, in order.
    pub const FRAME: [Phase; 2] = [Phase::PostInit, Phase::Update];

    /// The phases run every frame while playing, in order.
    pub const PLAY: [Phase; 3] = [Phase::PlayStart, Phase::PlayLateStart, Phase::PlayUpdate];

    pub(crate) fn dispatch(self, variant: &mut dyn Variant, ctx: &mut VariantContext<'_>) {
        match self {
            Phase::PostInit => variant.on_post_init(ctx),
            Phase::Update => variant.on_update(ctx),
            Phase::PlayStart => variant.on_play_start(ctx),
            Phase::PlayLateStart => variant.on_play_late_start(ctx),
            Phase::PlayUpdate => variant.on_play_update(ctx),
        }
    }
}
