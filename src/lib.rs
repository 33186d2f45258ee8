//! padpipe: gamepad monitor with a local IPC broadcast channel.
//!
//! Polls a controller at a fixed rate, renders the state for a human
//! operator, and republishes every snapshot to external processes as
//! newline-delimited UTF-8 JSON over a well-known local channel (a Unix
//! domain socket on Unix, a named pipe on Windows).
//!
//! The pipeline is intentionally lossy: a single-slot [`StateBus`] keeps
//! only the newest snapshot, so a slow or absent consumer never builds a
//! backlog. Only the freshest value matters for a live control loop.

pub mod backend;
pub mod backends;
pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod ipc;
pub mod poll_loop;
pub mod render;
pub mod server;
pub mod snapshot;

pub use backend::InputBackend;
pub use bus::StateBus;
pub use client::{ClientTransport, LocalChannelClient};
pub use config::{BackendKind, Config};
pub use error::{Error, Result};
pub use poll_loop::PollLoop;
pub use server::IpcServer;
pub use snapshot::{Buttons, Snapshot, Sticks, Triggers};
