//! Crate-wide error type.
//!
//! Most failure modes in this pipeline are absorbed where they occur:
//! a missing controller is `connected: false` data, endpoint creation is
//! retried with backoff, a detached consumer resets the channel, and a
//! malformed frame is skipped by the consumer. The variants here cover
//! what is left: fatal startup conditions and the I/O and decode errors
//! that callers turn into one of the retries above.

use std::io;

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input backend could not start. Fatal: without a working backend
    /// no snapshot can ever be produced.
    #[error("input backend init failed: {0}")]
    Backend(String),

    /// Rejected configuration value; fatal at startup.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure with the operation that hit it.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// One frame failed to decode. Scoped to that frame only; the stream
    /// continues with the next delimiter.
    #[error("frame decode failed: {0}")]
    Decode(String),

    /// The consumer gave up waiting for the channel endpoint to appear.
    #[error("channel endpoint did not appear within {0:?}")]
    ConnectTimeout(std::time::Duration),
}

impl Error {
    pub(crate) fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }
}
