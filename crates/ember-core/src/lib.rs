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

//! # Ember Core
//!
//! Foundational crate containing entity handles, the reflection contracts,
//! and the variant lifecycle that the rest of the engine builds on.

#![warn(missing_docs)]

// Lets `#[derive(Reflect)]` expansions resolve `::ember_core` inside this crate too.
extern crate self as ember_core;

pub mod entity;
pub mod event;
pub mod reflect;
pub mod variant;

pub use entity::{EntityId, EntityIdAllocator};
pub use reflect::{
    Reflect, Reflected, TypeDescriptor, TypeRegistry, Value, ValueKind,
};
pub use variant::{Variant, VariantContext, VariantCreateInfo, VariantWorld};

/// Derive macro generating [`Reflect`] and [`Reflected`] implementations.
pub use ember_macros::Reflect;

#[doc(hidden)]
pub use inventory;
