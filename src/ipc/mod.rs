//! Local channel endpoints and addressing.
//!
//! The server exposes one well-known channel per process, resolvable by
//! any consumer without prior coordination:
//! - **Unix**: a Unix domain socket at `$XDG_RUNTIME_DIR/<name>.sock`,
//!   falling back to `/tmp/<name>.sock`.
//! - **Windows**: a named pipe at `\\.\pipe\<name>`.
//!
//! Both platform modules expose the same two types:
//! - `ChannelEndpoint`: one bound listening endpoint. `bind` creates it,
//!   `accept` consumes it and hands back the streaming half once a
//!   consumer attaches (or `None` on shutdown). A fresh endpoint is bound
//!   for every consumer session, so a detached consumer never leaves a
//!   half-closed object behind for the next one.
//! - `ChannelStream`: the connected, blocking write half.

use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use self::unix::{ChannelEndpoint, ChannelStream};
#[cfg(windows)]
pub use self::windows::{ChannelEndpoint, ChannelStream};

/// Resolved platform address of a local channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelAddr(PathBuf);

impl ChannelAddr {
    /// Resolve a well-known channel name to its platform object path.
    pub fn from_name(name: &str) -> Self {
        #[cfg(windows)]
        {
            Self(PathBuf::from(format!(r"\\.\pipe\{name}")))
        }
        #[cfg(unix)]
        {
            let dir = std::env::var_os("XDG_RUNTIME_DIR")
                .map(PathBuf::from)
                .filter(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from("/tmp"));
            Self(dir.join(format!("{name}.sock")))
        }
    }

    /// Bind an explicit path instead of a well-known name (tests,
    /// nonstandard layouts).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ChannelAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_resolves_to_a_platform_path() {
        let addr = ChannelAddr::from_name("XboxReaderPipe");
        let text = addr.to_string();
        #[cfg(unix)]
        assert!(text.ends_with("XboxReaderPipe.sock"), "{text}");
        #[cfg(windows)]
        assert!(text.starts_with(r"\\.\pipe\"), "{text}");
    }

    #[test]
    fn explicit_paths_pass_through() {
        let addr = ChannelAddr::from_path("/tmp/custom.sock");
        assert_eq!(addr.as_path(), Path::new("/tmp/custom.sock"));
    }
}
