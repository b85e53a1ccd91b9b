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

//! The process-wide catalog of reflected types.

use super::{RegistryError, TypeDescriptor, TypeRegistration, Value};
use crate::variant::{Variant, VariantCreateInfo};
use std::collections::HashMap;

/// Maps type names to their descriptors.
///
/// Populated once at startup, then shared read-only (typically behind an
/// `Arc`) by the store, the serializer, and the message handlers.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every statically declared [`TypeRegistration`].
    ///
    /// Duplicate names are logged and the later declaration is ignored.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<TypeRegistration> {
            if let Err(e) = registry.register(registration.build()) {
                log::error!("Skipping type registration: {e}");
            }
        }
        log::info!("Type registry initialised with {} types.", registry.len());
        registry
    }

    /// Adds a descriptor.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateType(name));
        }
        log::debug!(
            "Registered type '{}' with {} properties.",
            name,
            descriptor.properties().len()
        );
        self.by_name.insert(name, self.types.len());
        self.types.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by its unique name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.by_name.get(name).map(|&index| &self.types[index])
    }

    /// Like [`lookup_by_name`](Self::lookup_by_name) but as a `Result`.
    pub fn resolve(&self, name: &str) -> Result<&TypeDescriptor, RegistryError> {
        self.lookup_by_name(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    /// Every constructible type declaring `base`, excluding `base` itself.
    pub fn all_descended_from(&self, base: &str) -> Vec<&TypeDescriptor> {
        self.types
            .iter()
            .filter(|d| d.name() != base)
            .filter(|d| d.is_descended_from(base))
            .filter(|d| d.constructor().is_some())
            .collect()
    }

    /// Constructs a default instance of `name`.
    ///
    /// Positional `args` are assigned to properties in declaration order,
    /// running any `on_set` callbacks.
    pub fn instantiate(
        &self,
        name: &str,
        info: &VariantCreateInfo,
        args: &[Value],
    ) -> Result<(&TypeDescriptor, Box<dyn Variant>), RegistryError> {
        let descriptor = self.resolve(name)?;
        let constructor = descriptor
            .constructor()
            .ok_or(RegistryError::NotConstructible(descriptor.name()))?;

        if args.len() > descriptor.properties().len() {
            return Err(RegistryError::TooManyArguments {
                type_name: descriptor.name(),
                max: descriptor.properties().len(),
                given: args.len(),
            });
        }

        let mut instance = constructor(info);
        for (property, arg) in descriptor.properties().iter().zip(args) {
            let target: &mut dyn Variant = &mut *instance;
            descriptor
                .set(target.as_any_mut(), property.name, arg.clone())
                .map_err(|source| RegistryError::Argument {
                    type_name: descriptor.name(),
                    property: property.name,
                    source,
                })?;
        }
        Ok((descriptor, instance))
    }

    /// Iterates every registered descriptor in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{
        downcast_instance, downcast_instance_mut, PropertyDescriptor, PropertyMetadata,
        ValueKind, VARIANT_BASE,
    };
    use crate::reflect::Reflect;
    use crate::EntityId;

    #[derive(Debug, Default)]
    struct Counter {
        count: i32,
    }

    impl Variant for Counter {}

    fn counter_descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Counter")
            .with_base(VARIANT_BASE)
            .with_constructor(|_info| Box::new(Counter::default()))
            .with_property(PropertyDescriptor {
                name: "count",
                kind: ValueKind::Integer,
                get: |instance| Ok(downcast_instance::<Counter>(instance, "Counter")?.count.to_value()),
                set: |instance, value| {
                    downcast_instance_mut::<Counter>(instance, "Counter")?.count =
                        i32::from_value(value)?;
                    Ok(())
                },
                metadata: PropertyMetadata::default(),
            })
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register(counter_descriptor()).unwrap();

        assert!(registry.lookup_by_name("Counter").is_some());
        assert!(registry.lookup_by_name("Missing").is_none());
        assert_eq!(
            registry.resolve("Missing").unwrap_err(),
            RegistryError::UnknownType("Missing".to_string())
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(counter_descriptor()).unwrap();

        let result = registry.register(counter_descriptor());

        assert_eq!(result, Err(RegistryError::DuplicateType("Counter")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn descended_from_excludes_marker_and_plain_objects() {
        let mut registry = TypeRegistry::new();
        registry.register(counter_descriptor()).unwrap();
        registry
            .register(TypeDescriptor::new(VARIANT_BASE).with_constructor(|_| Box::new(Counter::default())))
            .unwrap();
        registry.register(TypeDescriptor::new("Vec2")).unwrap();

        let names: Vec<_> = registry
            .all_descended_from(VARIANT_BASE)
            .into_iter()
            .map(|d| d.name())
            .collect();

        assert_eq!(names, vec!["Counter"]);
    }

    #[test]
    fn instantiate_applies_positional_arguments() {
        let mut registry = TypeRegistry::new();
        registry.register(counter_descriptor()).unwrap();
        let info = VariantCreateInfo {
            entity_id: EntityId(3),
        };

        let (descriptor, instance) = registry
            .instantiate("Counter", &info, &[Value::Int(12)])
            .unwrap();

        let value = descriptor.get(instance.as_ref().as_any(), "count").unwrap();
        assert_eq!(value, Value::Int(12));
    }

    #[test]
    fn instantiate_rejects_extra_arguments() {
        let mut registry = TypeRegistry::new();
        registry.register(counter_descriptor()).unwrap();
        let info = VariantCreateInfo {
            entity_id: EntityId(3),
        };

        let result = registry.instantiate("Counter", &info, &[Value::Int(1), Value::Int(2)]);

        assert!(matches!(
            result,
            Err(RegistryError::TooManyArguments { max: 1, given: 2, .. })
        ));
    }
}
