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

//! In-process transport over `crossbeam-channel`.

use super::{FrameReceiver, FrameSender, Link};
use crate::error::TransportError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Sending half of an in-memory link.
#[derive(Debug, Clone)]
pub struct MemorySender(Sender<String>);

/// Receiving half of an in-memory link.
#[derive(Debug)]
pub struct MemoryReceiver(Receiver<String>);

impl FrameSender for MemorySender {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        self.0
            .send(frame.to_string())
            .map_err(|_| TransportError::Disconnected)
    }
}

impl FrameReceiver for MemoryReceiver {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, TransportError> {
        match self.0.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

/// One unidirectional channel.
pub fn channel() -> (MemorySender, MemoryReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (MemorySender(tx), MemoryReceiver(rx))
}

/// Two connected links, `(editor, engine)`.
pub fn pair() -> (Link, Link) {
    let (to_engine, from_editor) = channel();
    let (to_editor, from_engine) = channel();
    (
        Link::new(to_engine, from_engine),
        Link::new(to_editor, from_editor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_arrive_in_order() {
        let (editor, mut engine) = pair();

        editor.sender.send("a").unwrap();
        editor.sender.send("b").unwrap();

        let timeout = Duration::from_millis(10);
        assert_eq!(engine.receiver.recv_timeout(timeout).unwrap().as_deref(), Some("a"));
        assert_eq!(engine.receiver.recv_timeout(timeout).unwrap().as_deref(), Some("b"));
        assert_eq!(engine.receiver.recv_timeout(timeout).unwrap(), None);
    }

    #[test]
    fn dropped_peer_is_reported() {
        let (editor, mut engine) = pair();
        drop(editor);

        let result = engine.receiver.recv_timeout(Duration::from_millis(10));

        assert!(matches!(result, Err(TransportError::Disconnected)));
        assert!(engine.sender.send("x").is_err());
    }
}
