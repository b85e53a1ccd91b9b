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

use crate::message::{LogLevel, SyncMessage};
use crate::transport::FrameSender;
use env_logger::{Builder, Env};
use log::{LevelFilter, Log, Metadata, Record};
use std::cell::Cell;
use std::sync::{Arc, OnceLock};

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

type Sink = Arc<OnceLock<(Arc<dyn FrameSender>, LevelFilter)>>;

/// A `log` backend that prints locally through `env_logger` and forwards
/// records at or above a threshold to the editor as `log_message`.
///
/// Nothing is forwarded until a sender is attached through a
/// [`RemoteLogSink`], so the logger can be installed before the link exists.
pub struct RemoteLogger {
    local: env_logger::Logger,
    sink: Sink,
}

/// Attaches the outbound link to an installed [`RemoteLogger`].
#[derive(Clone)]
pub struct RemoteLogSink(Sink);

impl RemoteLogSink {
    /// Starts forwarding records at or above `threshold` through `sender`.
    /// Only the first call has effect.
    ///
    /// Raises the global `log` max level to `threshold` if needed.
    pub fn attach(&self, sender: Arc<dyn FrameSender>, threshold: LevelFilter) -> bool {
        if self.0.set((sender, threshold)).is_err() {
            return false;
        }
        if threshold > log::max_level() {
            log::set_max_level(threshold);
        }
        true
    }

    /// True once a sender is attached.
    pub fn is_attached(&self) -> bool {
        self.0.get().is_some()
    }
}

impl RemoteLogger {
    /// Builds a logger whose local half reads `RUST_LOG` (default `info`).
    pub fn new() -> Self {
        let local = Builder::from_env(Env::default().default_filter_or("info")).build();
        Self {
            local,
            sink: Arc::new(OnceLock::new()),
        }
    }

    /// A handle for attaching the link later.
    pub fn sink(&self) -> RemoteLogSink {
        RemoteLogSink(Arc::clone(&self.sink))
    }

    /// Installs the logger as the global `log` backend.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let max_level = match self.sink.get() {
            Some((_, threshold)) => self.local.filter().max(*threshold),
            None => self.local.filter(),
        };
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn forward(&self, record: &Record<'_>) {
        let Some((sender, threshold)) = self.sink.get() else {
            return;
        };
        if record.level() > *threshold {
            return;
        }
        // A send that logs would otherwise recurse.
        if FORWARDING.with(|flag| flag.replace(true)) {
            return;
        }
        let message = SyncMessage::LogMessage {
            level: LogLevel::from(record.level()),
            message: record.args().to_string(),
        };
        if let Ok(frame) = message.encode() {
            let _ = sender.send(&frame);
        }
        FORWARDING.with(|flag| flag.set(false));
    }
}

impl Default for RemoteLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RemoteLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLogger")
            .field("threshold", &self.sink.get().map(|(_, t)| *t))
            .finish_non_exhaustive()
    }
}

impl Log for RemoteLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.local.enabled(metadata)
            || self
                .sink
                .get()
                .is_some_and(|(_, threshold)| metadata.level() <= *threshold)
    }

    fn log(&self, record: &Record<'_>) {
        if self.local.matches(record) {
            self.local.log(record);
        }
        self.forward(record);
    }

    fn flush(&self) {
        self.local.flush();
    }
}
