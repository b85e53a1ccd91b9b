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

//! The variant lifecycle contract.
//!
//! A variant is a single polymorphic component instance attached to an
//! entity. The store drives its hooks at well-defined points of the frame;
//! hooks reach sibling variants and other entities only through the
//! [`VariantContext`] they are handed.

use crate::entity::EntityId;
use crate::reflect::{Reflected, RegistryError};
use std::any::Any;

/// Parameters handed to a type's constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantCreateInfo {
    /// The entity the new instance will belong to.
    pub entity_id: EntityId,
}

/// Upcasting helper, implemented for every `'static` type.
pub trait AsAny {
    /// Borrows `self` as `Any`.
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrows `self` as `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A component type with lifecycle hooks.
///
/// Every hook defaults to doing nothing. Within one frame the store calls
/// them in this order: `on_post_init` (once ever), `on_update`, then while
/// playing `on_play_start` and `on_play_late_start` (once per session) and
/// `on_play_update`. `on_init` runs as soon as the variant is attached.
pub trait Variant: AsAny + Send + 'static {
    /// Called right after the variant is attached to its entity.
    fn on_init(&mut self, _ctx: &mut VariantContext<'_>) {}

    /// Called once, on the first post-init pass after creation.
    fn on_post_init(&mut self, _ctx: &mut VariantContext<'_>) {}

    /// Called every frame while alive.
    fn on_update(&mut self, _ctx: &mut VariantContext<'_>) {}

    /// Called once when play mode starts.
    fn on_play_start(&mut self, _ctx: &mut VariantContext<'_>) {}

    /// Called once after every variant has seen `on_play_start`.
    fn on_play_late_start(&mut self, _ctx: &mut VariantContext<'_>) {}

    /// Called every frame while playing and not paused.
    fn on_play_update(&mut self, _ctx: &mut VariantContext<'_>) {}
}

/// Store operations available to a running hook.
///
/// Implemented by the variant store. The variant whose hook is running is
/// checked out of the store for the duration of the call and is therefore
/// invisible through this interface.
pub trait VariantWorld {
    /// Finds the first live variant of `type_name` on `entity`.
    fn variant(&self, entity: EntityId, type_name: &str) -> Option<&dyn Variant>;

    /// Mutable form of [`variant`](Self::variant).
    fn variant_mut(&mut self, entity: EntityId, type_name: &str) -> Option<&mut dyn Variant>;

    /// Allocates a fresh entity.
    fn spawn_entity(&mut self) -> EntityId;

    /// Attaches a default-constructed variant. Its `on_init` runs immediately.
    fn attach_variant(&mut self, entity: EntityId, type_name: &str) -> Result<(), RegistryError>;

    /// Soft-deletes every variant of `type_name` on `entity`.
    fn detach_variant(&mut self, entity: EntityId, type_name: &str) -> usize;

    /// Hard-deletes an entity.
    fn despawn_entity(&mut self, entity: EntityId) -> bool;

    /// Every entity currently in the store.
    fn entities(&self) -> Vec<EntityId>;

    /// Seconds covered by the frame being simulated.
    fn delta_seconds(&self) -> f32;
}

/// What a lifecycle hook receives.
pub struct VariantContext<'w> {
    entity: EntityId,
    world: &'w mut dyn VariantWorld,
}

impl<'w> VariantContext<'w> {
    /// Creates a context for a variant of `entity`.
    pub fn new(entity: EntityId, world: &'w mut dyn VariantWorld) -> Self {
        Self { entity, world }
    }

    /// The entity owning the running variant.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Typed lookup of a sibling variant.
    pub fn get<T: Variant + Reflected>(&self) -> Option<&T> {
        self.get_from(self.entity)
    }

    /// Typed mutable lookup of a sibling variant.
    pub fn get_mut<T: Variant + Reflected>(&mut self) -> Option<&mut T> {
        self.get_mut_from(self.entity)
    }

    /// Typed lookup on any entity.
    pub fn get_from<T: Variant + Reflected>(&self, entity: EntityId) -> Option<&T> {
        self.world
            .variant(entity, T::TYPE_NAME)?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Typed mutable lookup on any entity.
    pub fn get_mut_from<T: Variant + Reflected>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.world
            .variant_mut(entity, T::TYPE_NAME)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Seconds covered by the frame being simulated.
    pub fn delta_seconds(&self) -> f32 {
        self.world.delta_seconds()
    }

    /// Full access to the store operations.
    pub fn world(&mut self) -> &mut dyn VariantWorld {
        &mut *self.world
    }
}
