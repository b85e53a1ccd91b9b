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

//! The authoritative entity/variant store.
//!
//! [`Storage`] maps each [`EntityId`] to an ordered sequence of
//! [`VariantCell`]s. It is owned and mutated by the simulation thread only,
//! so it carries no internal locking. Removal of a single variant is soft:
//! the cell is flagged dead and swept by [`Storage::garbage_collect`], which
//! must only run between phases.

mod cell;
mod error;
mod phase;
mod property;

pub use cell::VariantCell;
pub use error::{PathError, StorageError};
pub use phase::Phase;
pub use property::{split_path, update_property_path};

use ember_core::reflect::{Reflected, RegistryError, TypeRegistry, Value};
use ember_core::{
    EntityId, EntityIdAllocator, Variant, VariantContext, VariantCreateInfo, VariantWorld,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entity id to ordered variant sequence.
pub struct Storage {
    registry: Arc<TypeRegistry>,
    entities: BTreeMap<EntityId, Vec<VariantCell>>,
    allocator: EntityIdAllocator,
    started: bool,
    late_started: bool,
    delta_seconds: f32,
}

impl Storage {
    /// Creates an empty store resolving types through `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            entities: BTreeMap::new(),
            allocator: EntityIdAllocator::new(),
            started: false,
            late_started: false,
            delta_seconds: 0.0,
        }
    }

    /// The registry this store resolves type names with.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Allocates a fresh entity with no variants.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.insert(id, Vec::new());
        log::trace!("Created entity {id}.");
        id
    }

    /// Makes sure `entity` exists, keeping the allocator ahead of it.
    pub fn ensure_entity(&mut self, entity: EntityId) -> &mut Vec<VariantCell> {
        self.allocator.observe(entity);
        self.entities.entry(entity).or_default()
    }

    /// True if `entity` is present, even with no variants.
    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Constructs `type_name` bound to `entity`, appends it and runs `on_init`.
    ///
    /// Positional `args` are assigned to properties in declaration order. An
    /// entity that does not exist yet is created.
    pub fn add_variant(
        &mut self,
        entity: EntityId,
        type_name: &str,
        args: &[Value],
    ) -> Result<&mut VariantCell, StorageError> {
        let info = VariantCreateInfo { entity_id: entity };
        let (descriptor, instance) = self.registry.instantiate(type_name, &info, args)?;
        let cell = VariantCell::new(entity, descriptor.name(), instance);
        Ok(self.insert_cell(cell))
    }

    /// Attaches an already built instance of a reflected type.
    pub fn attach<T: Variant + Reflected>(&mut self, entity: EntityId, value: T) -> &mut VariantCell {
        self.insert_cell(VariantCell::new(entity, T::TYPE_NAME, Box::new(value)))
    }

    /// Appends a prepared cell to its entity and runs `on_init`.
    pub fn insert_cell(&mut self, mut cell: VariantCell) -> &mut VariantCell {
        let entity = cell.entity_id();
        self.ensure_entity(entity);

        if let Some(mut instance) = cell.instance.take() {
            let mut ctx = VariantContext::new(entity, self);
            instance.on_init(&mut ctx);
            cell.instance = Some(instance);
        }

        let cells = self.ensure_entity(entity);
        let index = cells.len();
        cells.push(cell);
        &mut cells[index]
    }

    /// First live variant of type `T` on `entity`.
    pub fn get_variant<T: Variant + Reflected>(&self, entity: EntityId) -> Option<&T> {
        self.entities
            .get(&entity)?
            .iter()
            .filter(|c| c.is_live() && c.type_name() == T::TYPE_NAME)
            .find_map(|c| c.downcast_ref::<T>())
    }

    /// Mutable form of [`get_variant`](Self::get_variant).
    pub fn get_variant_mut<T: Variant + Reflected>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(&entity)?
            .iter_mut()
            .filter(|c| c.is_live() && c.type_name() == T::TYPE_NAME)
            .find_map(|c| c.downcast_mut::<T>())
    }

    /// First live cell of `type_name` on `entity`.
    pub fn find_variant(&self, entity: EntityId, type_name: &str) -> Option<&VariantCell> {
        self.entities
            .get(&entity)?
            .iter()
            .find(|c| c.is_live() && c.type_name() == type_name)
    }

    /// Mutable form of [`find_variant`](Self::find_variant).
    pub fn find_variant_mut(&mut self, entity: EntityId, type_name: &str) -> Option<&mut VariantCell> {
        self.entities
            .get_mut(&entity)?
            .iter_mut()
            .find(|c| c.is_live() && c.type_name() == type_name)
    }

    /// True if `entity` has a live variant of `type_name`.
    pub fn has_variant(&self, entity: EntityId, type_name: &str) -> bool {
        self.find_variant(entity, type_name).is_some()
    }

    /// Every cell of `entity`, dead ones included, in insertion order.
    pub fn variants(&self, entity: EntityId) -> &[VariantCell] {
        self.entities.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Soft-deletes every live variant of `type_name` on `entity`.
    ///
    /// Returns how many were marked. The cells stay in place until the next
    /// [`garbage_collect`](Self::garbage_collect).
    pub fn remove_variant(&mut self, entity: EntityId, type_name: &str) -> usize {
        let Some(cells) = self.entities.get_mut(&entity) else {
            return 0;
        };
        let mut marked = 0;
        for cell in cells.iter_mut().filter(|c| !c.dead && c.type_name() == type_name) {
            cell.dead = true;
            marked += 1;
        }
        marked
    }

    /// Hard-deletes `entity` and all of its variants.
    pub fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity).is_some()
    }

    /// Sweeps dead cells out of every entity. Returns how many were removed.
    pub fn garbage_collect(&mut self) -> usize {
        let mut removed = 0;
        for cells in self.entities.values_mut() {
            let before = cells.len();
            cells.retain(|c| !c.dead);
            removed += before - cells.len();
        }
        if removed > 0 {
            log::debug!("Garbage collected {removed} dead variants.");
        }
        removed
    }

    /// Runs the hook for `phase` on every live variant.
    ///
    /// The set of cells to visit is fixed when the pass starts: variants
    /// added by a hook are not visited by the same pass, and variants killed
    /// by an earlier hook are skipped. Each instance is checked out of its
    /// cell while its hook runs and put back afterwards, unless its entity
    /// was deleted in the meantime.
    pub fn run_phase(&mut self, phase: Phase) {
        match phase {
            Phase::PlayStart if self.started => return,
            Phase::PlayStart => self.started = true,
            Phase::PlayLateStart if self.late_started => return,
            Phase::PlayLateStart => self.late_started = true,
            _ => {}
        }

        let visits: Vec<(EntityId, usize)> = self
            .entities
            .iter()
            .flat_map(|(&entity, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.is_live())
                    .map(move |(index, _)| (entity, index))
            })
            .collect();

        for (entity, index) in visits {
            let Some(cell) = self.cell_mut(entity, index) else {
                continue;
            };
            if cell.dead {
                continue;
            }
            if phase == Phase::PostInit {
                if cell.post_initialized {
                    continue;
                }
                cell.post_initialized = true;
            }
            let type_name = cell.type_name();
            let Some(mut instance) = cell.instance.take() else {
                continue;
            };

            {
                let mut ctx = VariantContext::new(entity, self);
                phase.dispatch(instance.as_mut(), &mut ctx);
            }

            match self.cell_mut(entity, index) {
                Some(cell) if cell.instance.is_none() && cell.type_name() == type_name => {
                    cell.instance = Some(instance);
                }
                _ => log::trace!(
                    "'{type_name}' of entity {entity} was removed during {phase:?}; dropping it."
                ),
            }
        }
    }

    /// Re-arms the once-per-session play hooks.
    pub fn reset_play_flags(&mut self) {
        self.started = false;
        self.late_started = false;
    }

    /// True once the play-start pass ran in the current session.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Sets the frame time reported to hooks.
    pub fn set_delta_seconds(&mut self, delta_seconds: f32) {
        self.delta_seconds = delta_seconds;
    }

    /// Sets the property at `key_path` on the live `type_name` variant of `entity`.
    pub fn update_property(
        &mut self,
        entity: EntityId,
        type_name: &str,
        key_path: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        if !self.contains_entity(entity) {
            return Err(StorageError::UnknownEntity(entity));
        }
        let registry = Arc::clone(&self.registry);
        let descriptor = registry.resolve(type_name)?;
        let instance = self
            .find_variant_mut(entity, type_name)
            .and_then(VariantCell::instance_mut)
            .ok_or_else(|| StorageError::MissingVariant {
                entity,
                type_name: type_name.to_string(),
            })?;
        update_property_path(descriptor, instance.as_any_mut(), key_path, value)?;
        Ok(())
    }

    /// Removes every entity. The id allocator keeps counting.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Ids of every entity, in ascending order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterates entities with their cells, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[VariantCell])> {
        self.entities.iter().map(|(id, cells)| (*id, cells.as_slice()))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the store holds no entity.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn cell_mut(&mut self, entity: EntityId, index: usize) -> Option<&mut VariantCell> {
        self.entities.get_mut(&entity)?.get_mut(index)
    }
}

impl VariantWorld for Storage {
    fn variant(&self, entity: EntityId, type_name: &str) -> Option<&dyn Variant> {
        self.find_variant(entity, type_name)?.instance()
    }

    fn variant_mut(&mut self, entity: EntityId, type_name: &str) -> Option<&mut dyn Variant> {
        self.find_variant_mut(entity, type_name)?.instance_mut()
    }

    fn spawn_entity(&mut self) -> EntityId {
        self.create_entity()
    }

    fn attach_variant(&mut self, entity: EntityId, type_name: &str) -> Result<(), RegistryError> {
        match self.add_variant(entity, type_name, &[]) {
            Ok(_) => Ok(()),
            Err(StorageError::Registry(e)) => Err(e),
            Err(other) => Err(RegistryError::UnknownType(other.to_string())),
        }
    }

    fn detach_variant(&mut self, entity: EntityId, type_name: &str) -> usize {
        self.remove_variant(entity, type_name)
    }

    fn despawn_entity(&mut self, entity: EntityId) -> bool {
        self.remove_entity(entity)
    }

    fn entities(&self) -> Vec<EntityId> {
        self.entity_ids()
    }

    fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("entities", &self.entities)
            .field("started", &self.started)
            .field("late_started", &self.late_started)
            .finish_non_exhaustive()
    }
}
