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

//! # Ember Editor
//!
//! The editor side of the sync channel. An [`EditorSession`] keeps a mirror
//! of the last scene document, turns edits into single-field deltas for the
//! engine, and drives the engine's play mode.

pub mod console;
mod error;
mod session;

pub use console::Command;
pub use error::EditorError;
pub use session::{EditorSession, PlayState};
