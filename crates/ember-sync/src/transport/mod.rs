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

//! Frame transports. One frame carries exactly one JSON document.

pub mod memory;
pub mod tcp;

use crate::error::TransportError;
use std::time::Duration;

/// The sending half of a link. Shared between threads.
pub trait FrameSender: Send + Sync {
    /// Sends one frame.
    fn send(&self, frame: &str) -> Result<(), TransportError>;
}

/// The receiving half of a link. Owned by the receiver thread.
pub trait FrameReceiver: Send {
    /// Waits up to `timeout` for the next frame.
    ///
    /// `Ok(None)` means the timeout elapsed; [`TransportError::Disconnected`]
    /// means no frame will ever arrive.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, TransportError>;
}

/// Both halves of one side of a connection.
pub struct Link {
    /// Outbound frames.
    pub sender: Box<dyn FrameSender>,
    /// Inbound frames.
    pub receiver: Box<dyn FrameReceiver>,
}

impl Link {
    /// Pairs two halves.
    pub fn new(sender: impl FrameSender + 'static, receiver: impl FrameReceiver + 'static) -> Self {
        Self {
            sender: Box::new(sender),
            receiver: Box::new(receiver),
        }
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").finish_non_exhaustive()
    }
}
