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

use crate::error::TransportError;
use crate::message::SyncMessage;
use crate::transport::{FrameReceiver, FrameSender, Link};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const RECEIVE_POLL: Duration = Duration::from_millis(50);

/// Which process owns the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Announces itself and waits for confirmation.
    Engine,
    /// Waits for the engine and confirms it.
    Editor,
}

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link, or the link was shut down.
    Disconnected,
    /// Link up, handshake pending.
    Connecting,
    /// Handshake complete.
    Connected,
}

/// One side of the editor/engine channel.
///
/// A background thread moves raw frames from the transport into a FIFO
/// queue. The owning thread drains that queue with
/// [`raise_events`](Self::raise_events); nothing else consumes it.
pub struct SyncEndpoint {
    role: Role,
    state: ConnectionState,
    sender: Arc<dyn FrameSender>,
    inbound: Receiver<String>,
    pending: VecDeque<SyncMessage>,
    last_heartbeat: Option<Instant>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SyncEndpoint {
    /// Takes over `link` and starts the receiver thread.
    pub fn start(role: Role, link: Link) -> Result<Self, TransportError> {
        let Link { sender, receiver } = link;
        let (queue_tx, queue_rx) = crossbeam_channel::unbounded();
        let running = Arc::new(AtomicBool::new(true));

        let handle = thread::Builder::new()
            .name(format!("ember-sync-{role:?}").to_lowercase())
            .spawn({
                let running = Arc::clone(&running);
                move || receive_loop(receiver, queue_tx, running)
            })?;

        log::info!("Sync endpoint started as {role:?}.");
        Ok(Self {
            role,
            state: ConnectionState::Connecting,
            sender: Arc::from(sender),
            inbound: queue_rx,
            pending: VecDeque::new(),
            last_heartbeat: None,
            running,
            handle: Some(handle),
        })
    }

    /// The endpoint's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current handshake state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True once the handshake has completed.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// False once the receiver thread has stopped and its queue is empty.
    pub fn is_link_open(&self) -> bool {
        let receiving = self.handle.as_ref().is_some_and(|h| !h.is_finished());
        receiving || !self.inbound.is_empty() || !self.pending.is_empty()
    }

    /// A shared handle on the outbound half, for log forwarding.
    pub fn sender(&self) -> Arc<dyn FrameSender> {
        Arc::clone(&self.sender)
    }

    /// Encodes and sends one message.
    pub fn send(&self, message: &SyncMessage) -> Result<(), TransportError> {
        if self.state == ConnectionState::Disconnected {
            return Err(TransportError::Disconnected);
        }
        let frame = message.encode()?;
        log::trace!("-> {}", message.kind());
        self.sender.send(&frame)
    }

    /// Sends a liveness ping.
    pub fn heartbeat(&self) -> Result<(), TransportError> {
        self.send(&SyncMessage::Heartbeat)
    }

    /// When the peer's last heartbeat was seen.
    pub fn last_heartbeat(&self) -> Option<Instant> {
        self.last_heartbeat
    }

    /// Drains every queued frame, in arrival order.
    ///
    /// Frames that fail to decode are logged and dropped. The handshake is
    /// answered here: an editor confirms `engine_started`, an engine becomes
    /// connected on `engine_start_confirmed`. Every decoded message,
    /// handshake included, is returned.
    pub fn raise_events(&mut self) -> Vec<SyncMessage> {
        let mut messages: Vec<SyncMessage> = self.pending.drain(..).collect();
        while let Ok(frame) = self.inbound.try_recv() {
            if let Some(message) = self.accept_frame(&frame) {
                messages.push(message);
            }
        }
        messages
    }

    /// Engine side: sends `engine_started` up to `attempts` times, `interval`
    /// apart, until the editor confirms.
    ///
    /// Messages that arrive meanwhile are kept for the next
    /// [`raise_events`](Self::raise_events). Returns whether the handshake
    /// completed; `cancel` aborts between attempts.
    pub fn announce(&mut self, attempts: u32, interval: Duration, cancel: Option<&AtomicBool>) -> bool {
        for attempt in 1..=attempts {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                log::info!("Handshake cancelled.");
                return false;
            }
            if let Err(e) = self.send(&SyncMessage::EngineStarted) {
                log::error!("Failed to announce engine: {e}");
                return false;
            }
            log::debug!("Announced engine (attempt {attempt}/{attempts}).");

            let deadline = Instant::now() + interval;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.inbound.recv_timeout(remaining) {
                    Ok(frame) => {
                        if let Some(message) = self.accept_frame(&frame) {
                            let confirmed = message == SyncMessage::EngineStartConfirmed;
                            self.pending.push_back(message);
                            if confirmed {
                                return true;
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        log::error!("Link closed during handshake.");
                        return false;
                    }
                }
            }
        }
        log::error!("Editor did not confirm after {attempts} attempts.");
        false
    }

    fn accept_frame(&mut self, frame: &str) -> Option<SyncMessage> {
        let message = match SyncMessage::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Dropping inbound frame: {e}");
                return None;
            }
        };
        log::trace!("<- {}", message.kind());

        match (&message, self.role) {
            (SyncMessage::EngineStarted, Role::Editor) => {
                if let Err(e) = self.send(&SyncMessage::EngineStartConfirmed) {
                    log::error!("Failed to confirm engine start: {e}");
                }
                if self.state != ConnectionState::Connected {
                    log::info!("Engine connected.");
                }
                self.state = ConnectionState::Connected;
            }
            (SyncMessage::EngineStartConfirmed, Role::Engine) => {
                if self.state != ConnectionState::Connected {
                    log::info!("Connection to editor confirmed.");
                }
                self.state = ConnectionState::Connected;
            }
            (SyncMessage::Heartbeat, _) => self.last_heartbeat = Some(Instant::now()),
            _ => {}
        }
        Some(message)
    }

    /// Stops and joins the receiver thread. Undrained frames are discarded.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Sync receiver thread panicked.");
            }
            let discarded = self.inbound.try_iter().count() + self.pending.len();
            self.pending.clear();
            if discarded > 0 {
                log::debug!("Discarded {discarded} undrained messages.");
            }
            log::info!("Sync endpoint stopped.");
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Drop for SyncEndpoint {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SyncEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEndpoint")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

fn receive_loop(mut receiver: Box<dyn FrameReceiver>, queue: Sender<String>, running: Arc<AtomicBool>) {
    log::debug!("Sync receiver thread started.");
    while running.load(Ordering::Relaxed) {
        match receiver.recv_timeout(RECEIVE_POLL) {
            Ok(Some(frame)) => {
                if queue.send(frame).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(TransportError::Disconnected) => {
                log::info!("Sync peer disconnected.");
                break;
            }
            Err(e) => {
                log::error!("Sync receiver stopped: {e}");
                break;
            }
        }
    }
    log::debug!("Sync receiver thread stopped.");
}
