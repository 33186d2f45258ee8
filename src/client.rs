//! Consumer-side transport and frame decoding.
//!
//! [`ClientTransport`] is the capability a consumer programs against:
//! attach to the channel, receive one frame at a time, detach. The
//! concrete [`LocalChannelClient`] binds to the same channel family the
//! server exposes (Unix domain socket / named pipe); other channel
//! families (TCP, serial, message bus) can implement the same trait
//! without changing anything above it.
//!
//! Connecting tolerates "endpoint does not exist yet": the producer and
//! consumer may start in either order, so `connect` retries on a
//! configurable interval until the endpoint appears or an optional
//! timeout expires. The retry is cooperative polling because the
//! endpoint's existence is an OS object condition with no wait primitive.
//!
//! Framing: a frame may arrive split across reads, and one read may carry
//! several frames. [`FrameBuffer`] accumulates raw bytes and splits out
//! complete newline-delimited frames. A malformed frame is a per-frame
//! decode error; the stream continues with the next delimiter.

use std::io::{self, Read};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ipc::ChannelAddr;
use crate::snapshot::Snapshot;

/// Consumer-side capability over one local channel family.
pub trait ClientTransport {
    /// Attach to the channel, retrying until the endpoint exists.
    fn connect(&mut self) -> Result<()>;

    /// Next complete frame with the delimiter stripped, or `None` at
    /// end-of-stream.
    fn recv_frame(&mut self) -> Result<Option<Vec<u8>>>;

    /// Detach. Safe to call repeatedly.
    fn close(&mut self);
}

/// Accumulates raw reads and splits out newline-delimited frames.
#[derive(Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut frame: Vec<u8> = self.buf.drain(..=pos).collect();
        frame.pop(); // delimiter
        Some(frame)
    }
}

/// Decode one frame into a snapshot.
///
/// Failure is scoped to this frame; callers log it and move on to the
/// next one.
pub fn decode_frame(frame: &[u8]) -> Result<Snapshot> {
    let text = std::str::from_utf8(frame).map_err(|err| Error::Decode(err.to_string()))?;
    serde_json::from_str(text).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(unix)]
type RawStream = std::os::unix::net::UnixStream;
#[cfg(windows)]
type RawStream = std::fs::File;

/// Client for the server's local channel family.
pub struct LocalChannelClient {
    addr: ChannelAddr,
    retry: Duration,
    timeout: Option<Duration>,
    stream: Option<RawStream>,
    frames: FrameBuffer,
}

impl LocalChannelClient {
    /// `retry` is the interval between connect attempts; `timeout` bounds
    /// the overall wait (`None` waits forever).
    pub fn new(addr: ChannelAddr, retry: Duration, timeout: Option<Duration>) -> Self {
        Self {
            addr,
            retry,
            timeout,
            stream: None,
            frames: FrameBuffer::default(),
        }
    }

    fn try_open(&self) -> io::Result<RawStream> {
        #[cfg(unix)]
        {
            std::os::unix::net::UnixStream::connect(self.addr.as_path())
        }
        #[cfg(windows)]
        {
            std::fs::OpenOptions::new().read(true).open(self.addr.as_path())
        }
    }
}

impl ClientTransport for LocalChannelClient {
    fn connect(&mut self) -> Result<()> {
        let started = Instant::now();
        loop {
            match self.try_open() {
                Ok(stream) => {
                    self.stream = Some(stream);
                    self.frames = FrameBuffer::default();
                    return Ok(());
                }
                Err(err) => {
                    if let Some(timeout) = self.timeout {
                        if started.elapsed() >= timeout {
                            return Err(Error::ConnectTimeout(timeout));
                        }
                    }
                    debug!(%err, "channel not available yet, retrying");
                    std::thread::sleep(self.retry);
                }
            }
        }
    }

    fn recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(frame) = self.frames.next_frame() {
                return Ok(Some(frame));
            }
            let Some(stream) = self.stream.as_mut() else {
                return Ok(None);
            };
            let mut chunk = [0u8; 4096];
            match stream.read(&mut chunk) {
                Ok(0) => {
                    self.close();
                    return Ok(None);
                }
                Ok(n) => self.frames.extend(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    self.close();
                    return Ok(None);
                }
                Err(err) => {
                    self.close();
                    return Err(Error::io("channel read", err));
                }
            }
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}
