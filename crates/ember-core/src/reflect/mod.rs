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

//! Runtime reflection over an open set of component types.
//!
//! Component types describe themselves once, at startup, through a
//! [`TypeDescriptor`]: an ordered list of typed properties with get/set
//! accessors, optional per-property metadata, named callback methods, and a
//! constructor. Property values cross the type-erased boundary as [`Value`]
//! trees, which the serializer and the sync protocol work with directly.
//!
//! Descriptors are normally produced by `#[derive(Reflect)]` and collected
//! with [`TypeRegistry::from_inventory`].

mod convert;
mod descriptor;
mod error;
mod registry;
mod value;

pub use convert::{downcast_instance, downcast_instance_mut, Reflect, Reflected};
pub use descriptor::{
    Constructor, MethodDescriptor, PropertyDescriptor, PropertyMetadata, TypeDescriptor,
    TypeRegistration, VARIANT_BASE,
};
pub use error::{ReflectError, RegistryError};
pub use registry::TypeRegistry;
pub use value::{Value, ValueKind};
