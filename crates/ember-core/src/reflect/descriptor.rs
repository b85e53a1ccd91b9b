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

//! Type, property, and method descriptors.

use super::{ReflectError, Value, ValueKind};
use crate::variant::{Variant, VariantCreateInfo};
use std::any::Any;
use std::fmt;

/// Base marker carried by every component type.
pub const VARIANT_BASE: &str = "Variant";

/// Builds a default instance bound to the creation info.
pub type Constructor = fn(&VariantCreateInfo) -> Box<dyn Variant>;

/// Reads a property out of a type-erased instance.
pub type PropertyGetter = fn(&dyn Any) -> Result<Value, ReflectError>;

/// Writes a property into a type-erased instance.
pub type PropertySetter = fn(&mut dyn Any, Value) -> Result<(), ReflectError>;

/// Invokes a parameterless method on a type-erased instance.
pub type MethodInvoker = fn(&mut dyn Any) -> Result<(), ReflectError>;

/// Per-property flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyMetadata {
    /// Skip this property when serializing.
    pub no_serialize: bool,
    /// Method to invoke right after the property is set.
    pub on_set: Option<&'static str>,
}

/// A named, typed property with accessors.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Property name, unique within its type.
    pub name: &'static str,
    /// Declared kind.
    pub kind: ValueKind,
    /// Getter.
    pub get: PropertyGetter,
    /// Setter.
    pub set: PropertySetter,
    /// Flags.
    pub metadata: PropertyMetadata,
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A named method that property callbacks can refer to.
#[derive(Clone)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: &'static str,
    /// Invoker.
    pub invoke: MethodInvoker,
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Everything the engine knows about a reflected type.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: &'static str,
    bases: Vec<&'static str>,
    properties: Vec<PropertyDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructor: Option<Constructor>,
}

impl TypeDescriptor {
    /// Starts an empty descriptor.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bases: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructor: None,
        }
    }

    /// Declares a base marker.
    pub fn with_base(mut self, base: &'static str) -> Self {
        self.bases.push(base);
        self
    }

    /// Sets the constructor.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Appends a property. Declaration order is preserved.
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Appends a method.
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// The unique type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared base markers.
    pub fn bases(&self) -> &[&'static str] {
        &self.bases
    }

    /// True if `base` is among the declared bases.
    pub fn is_descended_from(&self, base: &str) -> bool {
        self.bases.iter().any(|b| *b == base)
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Declared methods.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The constructor, for component types.
    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    /// Whether `property` is flagged as not serialized.
    pub fn no_serialize(&self, property: &str) -> bool {
        self.property(property)
            .map(|p| p.metadata.no_serialize)
            .unwrap_or(false)
    }

    /// The callback to run after `property` is set, if any.
    pub fn on_set_callback(&self, property: &str) -> Option<&'static str> {
        self.property(property).and_then(|p| p.metadata.on_set)
    }

    /// Reads a property by name.
    pub fn get(&self, instance: &dyn Any, property: &str) -> Result<Value, ReflectError> {
        let descriptor = self.require_property(property)?;
        (descriptor.get)(instance)
    }

    /// Writes a property by name, then runs its `on_set` callback.
    pub fn set(
        &self,
        instance: &mut dyn Any,
        property: &str,
        value: Value,
    ) -> Result<(), ReflectError> {
        let descriptor = self.require_property(property)?;
        (descriptor.set)(instance, value)?;
        if let Some(callback) = descriptor.metadata.on_set {
            self.invoke(instance, callback)?;
        }
        Ok(())
    }

    /// Invokes a declared method by name.
    pub fn invoke(&self, instance: &mut dyn Any, method: &str) -> Result<(), ReflectError> {
        let descriptor = self.method(method).ok_or_else(|| ReflectError::UnknownMethod {
            type_name: self.name,
            method: method.to_string(),
        })?;
        (descriptor.invoke)(instance)
    }

    fn require_property(&self, property: &str) -> Result<&PropertyDescriptor, ReflectError> {
        self.property(property)
            .ok_or_else(|| ReflectError::UnknownProperty {
                type_name: self.name,
                property: property.to_string(),
            })
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("bases", &self.bases)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// A statically declared type, collected at startup.
///
/// `#[derive(Reflect)]` submits one of these for every reflected struct.
pub struct TypeRegistration {
    build: fn() -> TypeDescriptor,
}

impl TypeRegistration {
    /// Wraps a descriptor builder.
    pub const fn new(build: fn() -> TypeDescriptor) -> Self {
        Self { build }
    }

    /// Builds the descriptor.
    pub fn build(&self) -> TypeDescriptor {
        (self.build)()
    }
}

inventory::collect!(TypeRegistration);
