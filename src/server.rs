//! IPC server: the listen/stream/reconnect lifecycle of one channel.
//!
//! Per channel instance the server cycles through
//! `Idle -> Listening -> Connected -> Idle`:
//! - endpoint creation failure is transient; retried after a backoff,
//!   never fatal,
//! - accept blocks until a consumer attaches and holds no locks,
//! - while connected, every bus update is serialized to a
//!   newline-delimited JSON frame and written to the channel,
//! - a write failure means the consumer detached; the endpoint is
//!   discarded and a fresh one is bound so the next consumer attaches
//!   cleanly.
//!
//! Shutdown reaches all three blocking points: the accept path polls the
//! process-wide flag, the bus wait drains on `close()`, and a blocked
//! write is bounded by the daemon's grace period.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bus::StateBus;
use crate::ipc::{ChannelAddr, ChannelEndpoint, ChannelStream};

pub struct IpcServer {
    addr: ChannelAddr,
    bus: Arc<StateBus>,
    shutdown: Arc<AtomicBool>,
    bind_backoff: Duration,
}

impl IpcServer {
    pub fn new(
        addr: ChannelAddr,
        bus: Arc<StateBus>,
        shutdown: Arc<AtomicBool>,
        bind_backoff: Duration,
    ) -> Self {
        Self {
            addr,
            bus,
            shutdown,
            bind_backoff,
        }
    }

    /// Run the accept/stream cycle until shutdown. Endpoint trouble is
    /// retried and a detached consumer is a normal reset, so this never
    /// returns an error.
    pub fn run(&self) {
        info!(channel = %self.addr, "ipc server listening");
        while !self.shutdown.load(Ordering::Relaxed) {
            let endpoint = match ChannelEndpoint::bind(&self.addr) {
                Ok(endpoint) => endpoint,
                Err(err) => {
                    warn!(%err, "channel endpoint creation failed, retrying");
                    self.backoff();
                    continue;
                }
            };
            let stream = match endpoint.accept(&self.shutdown) {
                Ok(Some(stream)) => stream,
                Ok(None) => break,
                Err(err) => {
                    warn!(%err, "accept failed, recreating endpoint");
                    self.backoff();
                    continue;
                }
            };
            info!("consumer attached");
            self.stream_frames(stream);
        }
        info!("ipc server stopped");
    }

    /// Stream frames until the consumer detaches or the bus closes.
    ///
    /// A fresh session starts at the current bus sequence: the consumer
    /// receives the next published snapshot, never a replay of old state.
    fn stream_frames(&self, mut stream: ChannelStream) {
        let mut seen = self.bus.seq();
        loop {
            let Some((seq, snapshot)) = self.bus.wait_newer(seen) else {
                let _ = stream.flush();
                return;
            };
            seen = seq;
            // Serialization happens here, outside the bus lock.
            let mut frame = match serde_json::to_vec(snapshot.as_ref()) {
                Ok(frame) => frame,
                Err(err) => {
                    error!(%err, "snapshot serialization failed");
                    continue;
                }
            };
            frame.push(b'\n');
            if let Err(err) = stream.write_all(&frame) {
                debug!(%err, "consumer detached");
                return;
            }
        }
    }

    /// Sleep out the bind backoff in small steps so shutdown stays
    /// responsive.
    fn backoff(&self) {
        const STEP: Duration = Duration::from_millis(50);
        let mut remaining = self.bind_backoff;
        while !self.shutdown.load(Ordering::Relaxed) && remaining > Duration::ZERO {
            let nap = remaining.min(STEP);
            std::thread::sleep(nap);
            remaining -= nap;
        }
    }
}
