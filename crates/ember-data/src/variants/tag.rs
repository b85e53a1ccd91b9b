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

use ember_core::{Reflect, Variant};

/// A human readable name plus free-form labels.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(variant)]
pub struct Tag {
    /// Display name.
    pub name: String,
    /// Labels used to group entities.
    pub labels: Vec<String>,
}

impl Tag {
    /// True if `label` is one of the tag's labels.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

impl Variant for Tag {}
