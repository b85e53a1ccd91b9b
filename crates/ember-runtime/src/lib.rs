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

//! # Ember Runtime
//!
//! The engine process. An [`Engine`] owns the type registry, the variant
//! store, the play-mode controller and, when launched from the editor, the
//! sync endpoint. Everything runs on the thread that calls
//! [`Engine::run_frame`].

pub mod config;
pub mod engine;
pub mod error;
pub mod play_mode;

pub use config::EngineConfig;
pub use engine::{Engine, EngineEvent};
pub use error::{EngineError, PlayModeError};
pub use play_mode::{PlayMode, PlayModeController};
