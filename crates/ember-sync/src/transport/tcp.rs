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

//! Newline-delimited JSON over a single TCP stream.
//!
//! The editor listens and accepts one engine; the engine connects with a
//! bounded number of attempts. Each side writes compact JSON followed by
//! `\n` and reads up to the next `\n`.

use super::{FrameReceiver, FrameSender, Link};
use crate::error::TransportError;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// Writing half of a TCP link.
#[derive(Debug)]
pub struct TcpSender {
    stream: Mutex<TcpStream>,
}

/// Reading half of a TCP link.
#[derive(Debug)]
pub struct TcpReceiver {
    reader: BufReader<TcpStream>,
    pending: Vec<u8>,
}

impl FrameSender for TcpSender {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        if frame.contains('\n') {
            return Err(TransportError::InvalidFrame);
        }
        let mut stream = self.stream.lock().unwrap();
        stream.write_all(frame.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }
}

impl FrameReceiver for TcpReceiver {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, TransportError> {
        // A zero timeout would mean "block forever" to the socket.
        let timeout = timeout.max(Duration::from_millis(1));
        self.reader.get_ref().set_read_timeout(Some(timeout))?;

        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(_) if self.pending.last() == Some(&b'\n') => {
                let mut line = std::mem::take(&mut self.pending);
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                String::from_utf8(line)
                    .map(Some)
                    .map_err(|_| TransportError::NotUtf8)
            }
            // Stream ended mid-frame.
            Ok(_) => Err(TransportError::Disconnected),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn link(stream: TcpStream) -> Result<Link, TransportError> {
    stream.set_nodelay(true)?;
    let reader = stream.try_clone()?;
    Ok(Link::new(
        TcpSender {
            stream: Mutex::new(stream),
        },
        TcpReceiver {
            reader: BufReader::new(reader),
            pending: Vec::new(),
        },
    ))
}

/// Binds the editor side.
pub fn listen(addr: impl ToSocketAddrs) -> Result<TcpListener, TransportError> {
    let listener = TcpListener::bind(addr)?;
    log::info!("Sync listener bound to {}.", listener.local_addr()?);
    Ok(listener)
}

/// Waits up to `timeout` for the engine to connect.
pub fn accept(listener: &TcpListener, timeout: Duration) -> Result<Link, TransportError> {
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;
    let deadline = Instant::now() + timeout;
    let mut polls = 0;
    loop {
        polls += 1;
        match listener.accept() {
            Ok((stream, peer)) => {
                listener.set_nonblocking(false)?;
                stream.set_nonblocking(false)?;
                log::info!("Engine connected from {peer}.");
                return link(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    listener.set_nonblocking(false)?;
                    return Err(TransportError::ConnectTimeout {
                        addr: addr.to_string(),
                        attempts: polls,
                    });
                }
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Connects the engine side, trying up to `attempts` times.
pub fn connect(addr: SocketAddr, attempts: u32, interval: Duration) -> Result<Link, TransportError> {
    for attempt in 1..=attempts {
        match TcpStream::connect_timeout(&addr, interval) {
            Ok(stream) => {
                log::info!("Connected to editor at {addr} (attempt {attempt}).");
                return link(stream);
            }
            Err(e) => {
                log::debug!("Connection attempt {attempt}/{attempts} to {addr} failed: {e}");
                if attempt < attempts {
                    thread::sleep(interval);
                }
            }
        }
    }
    Err(TransportError::ConnectTimeout {
        addr: addr.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cross_a_loopback_connection() {
        let listener = listen("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let engine = thread::spawn(move || {
            let link = connect(addr, 5, Duration::from_millis(100)).unwrap();
            link.sender.send(r#"{"type":"engine_started"}"#).unwrap();
            link
        });

        let mut editor = accept(&listener, Duration::from_secs(5)).unwrap();
        let frame = editor.receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        let mut engine = engine.join().unwrap();
        editor.sender.send("second").unwrap();

        assert_eq!(frame.as_deref(), Some(r#"{"type":"engine_started"}"#));
        assert_eq!(
            engine.receiver.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn newline_in_frame_is_rejected() {
        let listener = listen("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let engine = thread::spawn(move || connect(addr, 5, Duration::from_millis(100)).unwrap());
        let _editor = accept(&listener, Duration::from_secs(5)).unwrap();
        let engine = engine.join().unwrap();

        assert!(matches!(
            engine.sender.send("a\nb"),
            Err(TransportError::InvalidFrame)
        ));
    }

    #[test]
    fn accept_gives_up_after_timeout() {
        let listener = listen("127.0.0.1:0").unwrap();

        let result = accept(&listener, Duration::from_millis(50));

        assert!(matches!(result, Err(TransportError::ConnectTimeout { .. })));
    }
}
