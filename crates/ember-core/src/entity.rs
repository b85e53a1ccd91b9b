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

//! Defines entity handles and the allocator that hands them out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque handle grouping zero or more variants.
///
/// Ids are unique within one running store. They are not stable across
/// processes: a scene file is only meaningful relative to the ids it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Returns the raw integer carried on the wire and in files.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id generator.
///
/// Ids read back from files or messages must be reported through
/// [`EntityIdAllocator::observe`] so that freshly allocated ids never collide
/// with loaded ones.
#[derive(Debug, Clone)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    /// Creates an allocator whose first id is `1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hands out the next unused id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Records an externally supplied id.
    pub fn observe(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// Returns the id that the next call to `allocate` will produce.
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
