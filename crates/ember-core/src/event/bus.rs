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

use flume::TrySendError;

/// A thread-safe event channel generic over its event type.
///
/// The bus is owned by the producer. Observers either clone the sender to
/// publish or borrow the receiver to drain; nothing is stored globally.
/// A bounded bus keeps the newest events when nobody drains it.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a new bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Creates a bus holding at most `capacity` undrained events.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Sends an event, evicting the oldest one if the bus is full.
    pub fn publish(&self, event: T) {
        log::trace!("Publishing an event.");

        let event = match self.sender.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Full(event)) => {
                let _ = self.receiver.try_recv();
                log::trace!("Event bus full; dropped the oldest event.");
                event
            }
            Err(TrySendError::Disconnected(_)) => {
                log::error!("Failed to send event: receiver disconnected.");
                return;
            }
        };
        if let Err(e) = self.sender.try_send(event) {
            log::error!("Failed to send event: {e}.");
        }
    }

    /// Returns a clone of the sending half.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns the receiving half for the owner to drain.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Removes and returns every event currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
