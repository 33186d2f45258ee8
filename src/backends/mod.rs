//! Concrete input backends.
//!
//! One module per device API, selected once at startup:
//! - **`xinput`**: Windows XInput controllers (slots 0-3), behind the
//!   `xinput` feature and `cfg(windows)`.
//! - **`scripted`**: replays a queued snapshot sequence on any platform;
//!   drives tests and demo runs without hardware.

use crate::backend::InputBackend;
use crate::config::{BackendKind, Config};
use crate::Result;

pub mod scripted;

#[cfg(all(target_os = "windows", feature = "xinput"))]
pub mod xinput;

/// Build the configured backend. The caller still has to `init()` it.
pub fn create(config: &Config) -> Result<Box<dyn InputBackend>> {
    match config.backend {
        #[cfg(all(target_os = "windows", feature = "xinput"))]
        BackendKind::Xinput => Ok(Box::new(xinput::XInputBackend::new(config.device_index))),
        #[cfg(not(all(target_os = "windows", feature = "xinput")))]
        BackendKind::Xinput => Err(crate::Error::Backend(
            "xinput backend is not available in this build".into(),
        )),
        BackendKind::Scripted => Ok(Box::new(scripted::ScriptedBackend::new())),
    }
}
