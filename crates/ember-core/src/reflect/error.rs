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

//! Errors produced by reflection and the type registry.

use thiserror::Error;

/// A failure converting or accessing a reflected value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    /// The value had a different shape than the property expects.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// The expected kind.
        expected: &'static str,
        /// The kind actually supplied.
        found: &'static str,
    },
    /// A numeric value does not fit the target type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// The offending value, rendered.
        value: String,
        /// The target type name.
        target: &'static str,
    },
    /// An enum value named no known enumerator.
    #[error("'{name}' is not an enumerator of {enum_name}")]
    UnknownEnumerator {
        /// The enum type name.
        enum_name: &'static str,
        /// The rejected name or integer.
        name: String,
    },
    /// An accessor was handed an instance of the wrong type.
    #[error("instance is not a {0}")]
    WrongInstance(&'static str),
    /// No property with that name exists on the type.
    #[error("type {type_name} has no property '{property}'")]
    UnknownProperty {
        /// The type searched.
        type_name: &'static str,
        /// The missing property name.
        property: String,
    },
    /// No method with that name exists on the type.
    #[error("type {type_name} has no method '{method}'")]
    UnknownMethod {
        /// The type searched.
        type_name: &'static str,
        /// The missing method name.
        method: String,
    },
    /// A nested member failed to convert.
    #[error("member '{member}': {source}")]
    Member {
        /// The member that failed.
        member: String,
        /// The underlying failure.
        #[source]
        source: Box<ReflectError>,
    },
}

impl ReflectError {
    /// Wraps this error with the name of the member it occurred in.
    pub fn in_member(self, member: impl Into<String>) -> Self {
        ReflectError::Member {
            member: member.into(),
            source: Box::new(self),
        }
    }
}

/// A failure registering or resolving a type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No type is registered under that name.
    #[error("unknown type '{0}'")]
    UnknownType(String),
    /// Two descriptors claimed the same name.
    #[error("type '{0}' is already registered")]
    DuplicateType(&'static str),
    /// The type is registered but has no constructor.
    #[error("type '{0}' cannot be instantiated")]
    NotConstructible(&'static str),
    /// More positional arguments than properties were supplied.
    #[error("type '{type_name}' takes at most {max} arguments, {given} given")]
    TooManyArguments {
        /// The type being constructed.
        type_name: &'static str,
        /// Number of properties available.
        max: usize,
        /// Number of arguments supplied.
        given: usize,
    },
    /// A positional argument could not be assigned.
    #[error("argument for '{property}' of '{type_name}': {source}")]
    Argument {
        /// The type being constructed.
        type_name: &'static str,
        /// The property the argument was bound to.
        property: &'static str,
        /// The conversion failure.
        #[source]
        source: ReflectError,
    },
}
