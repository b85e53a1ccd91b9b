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

//! # Ember Sync
//!
//! The message channel between the editor process and the engine process.
//!
//! Every frame on the wire is one UTF-8 JSON document tagged by `"type"`.
//! A [`SyncEndpoint`] owns a background receiver thread that queues raw
//! frames; the consuming thread drains and decodes them once per frame with
//! [`SyncEndpoint::raise_events`].

#![warn(missing_docs)]

mod endpoint;
mod error;
mod message;
mod remote_log;
pub mod transport;

pub use endpoint::{ConnectionState, Role, SyncEndpoint};
pub use error::{ProtocolError, TransportError};
pub use message::{KeyType, LogLevel, SyncMessage};
pub use remote_log::{RemoteLogSink, RemoteLogger};
pub use transport::{FrameReceiver, FrameSender, Link};
