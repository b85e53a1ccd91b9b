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

use thiserror::Error;

/// A frame that cannot be turned into a [`SyncMessage`](crate::SyncMessage),
/// or a value string that does not match its key type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not JSON, not an object, no `type`, or a missing/mistyped field.
    #[error("malformed message: {0}")]
    Malformed(String),
    /// A well-formed envelope of a kind this build does not know.
    #[error("unknown message type '{0}'")]
    UnknownKind(String),
    /// A property value string that cannot be converted.
    #[error("cannot read '{raw}' as {key_type}")]
    InvalidValue {
        /// The declared key type.
        key_type: &'static str,
        /// The offending string.
        raw: String,
    },
    /// The message could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A failure moving frames between processes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer went away.
    #[error("the peer disconnected")]
    Disconnected,
    /// Socket-level failure.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No peer showed up in time.
    #[error("no connection to {addr} after {attempts} attempts")]
    ConnectTimeout {
        /// The address tried.
        addr: String,
        /// How many attempts were made.
        attempts: u32,
    },
    /// Frames are newline-delimited and cannot contain a newline.
    #[error("frame contains a raw newline")]
    InvalidFrame,
    /// A received frame is not UTF-8.
    #[error("frame is not valid UTF-8")]
    NotUtf8,
    /// The message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
