//! Runtime configuration.
//!
//! The defaults need no configuration for the common case: XInput slot 0,
//! 10 Hz, channel `XboxReaderPipe`. Individual knobs can be overridden by
//! a TOML file, `PADPIPE_*` environment variables and CLI flags, in that
//! order (later source wins).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which input backend to drive. Chosen once at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Xinput,
    Scripted,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xinput" => Ok(Self::Xinput),
            "scripted" => Ok(Self::Scripted),
            other => Err(Error::Config(format!("unknown backend {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Poll/refresh rate in Hz.
    pub tick_hz: u32,
    /// Well-known channel name consumers resolve without coordination.
    pub channel: String,
    /// Controller slot (0-3).
    pub device_index: u32,
    pub backend: BackendKind,
    /// Pause before retrying a failed endpoint creation.
    pub bind_backoff_ms: u64,
    /// Consumer-side interval between connect attempts.
    pub connect_retry_ms: u64,
    /// Consumer-side overall connect deadline; 0 waits forever.
    pub connect_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_hz: 10,
            channel: "XboxReaderPipe".to_string(),
            device_index: 0,
            backend: BackendKind::default(),
            bind_backoff_ms: 250,
            connect_retry_ms: 300,
            connect_timeout_ms: 0,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|err| Error::io("read config file", err))?;
        Self::from_toml_str(&text)
    }

    /// Apply `PADPIPE_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("PADPIPE_TICK_HZ") {
            self.tick_hz = v
                .parse()
                .map_err(|_| Error::Config(format!("PADPIPE_TICK_HZ: invalid value {v:?}")))?;
        }
        if let Ok(v) = std::env::var("PADPIPE_CHANNEL") {
            self.channel = v;
        }
        if let Ok(v) = std::env::var("PADPIPE_DEVICE") {
            self.device_index = v
                .parse()
                .map_err(|_| Error::Config(format!("PADPIPE_DEVICE: invalid value {v:?}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 {
            return Err(Error::Config("tick_hz must be at least 1".into()));
        }
        if self.device_index > 3 {
            return Err(Error::Config(format!(
                "device_index {} out of range (0-3)",
                self.device_index
            )));
        }
        if self.channel.is_empty() || self.channel.contains(['/', '\\']) {
            return Err(Error::Config(
                "channel must be a bare name, not a path".into(),
            ));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz))
    }

    pub fn bind_backoff(&self) -> Duration {
        Duration::from_millis(self.bind_backoff_ms)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }
}
