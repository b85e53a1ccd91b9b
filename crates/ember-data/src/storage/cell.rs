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

use ember_core::{EntityId, Variant};

/// One slot in an entity's variant sequence.
///
/// Besides the boxed instance the cell carries the owning entity (never
/// serialized) and the lifecycle flags the store sequences hooks with.
/// While a hook runs, its instance is checked out and the cell is empty.
pub struct VariantCell {
    entity_id: EntityId,
    type_name: &'static str,
    pub(crate) dead: bool,
    pub(crate) post_initialized: bool,
    pub(crate) instance: Option<Box<dyn Variant>>,
}

impl VariantCell {
    /// Wraps a freshly constructed instance.
    pub fn new(entity_id: EntityId, type_name: &'static str, instance: Box<dyn Variant>) -> Self {
        Self {
            entity_id,
            type_name,
            dead: false,
            post_initialized: false,
            instance: Some(instance),
        }
    }

    /// The owning entity.
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// The registered type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True once the variant has been soft-deleted.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// True once `on_post_init` has run.
    pub fn is_post_initialized(&self) -> bool {
        self.post_initialized
    }

    /// Not dead and not checked out by a running hook.
    pub fn is_live(&self) -> bool {
        !self.dead && self.instance.is_some()
    }

    /// Borrows the instance.
    pub fn instance(&self) -> Option<&dyn Variant> {
        self.instance.as_deref()
    }

    /// Mutably borrows the instance.
    pub fn instance_mut(&mut self) -> Option<&mut dyn Variant> {
        self.instance.as_deref_mut().map(|v| v as &mut dyn Variant)
    }

    /// Typed view of the instance.
    pub fn downcast_ref<T: Variant>(&self) -> Option<&T> {
        self.instance()?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable view of the instance.
    pub fn downcast_mut<T: Variant>(&mut self) -> Option<&mut T> {
        self.instance_mut()?.as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for VariantCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantCell")
            .field("entity_id", &self.entity_id)
            .field("type_name", &self.type_name)
            .field("dead", &self.dead)
            .field("post_initialized", &self.post_initialized)
            .field("checked_out", &self.instance.is_none())
            .finish()
    }
}
