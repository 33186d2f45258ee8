#![cfg(all(target_os = "windows", feature = "xinput"))]

//! Windows XInput backend.
//!
//! Polls one controller slot via `XInputGetState` and maps the raw gamepad
//! state onto a [`Snapshot`]:
//! - thumbsticks normalized to `[-1.0, 1.0]` with separate divisors per
//!   half (see [`normalize_thumb`]),
//! - triggers normalized to `[0.0, 1.0]`,
//! - `wButtons` bits mapped to the named button flags.
//!
//! Works over USB or Bluetooth as long as the Microsoft XInput driver is
//! active. A nonzero return from `XInputGetState` means the slot is empty
//! or the controller dropped; that is reported as a disconnected snapshot,
//! never as an error, and recovers by itself on a later poll.

use crate::backend::{normalize_thumb, normalize_trigger, InputBackend};
use crate::snapshot::{Buttons, Snapshot, Sticks, Triggers};
use crate::{Error, Result};

// Windows XInput FFI.
use windows_sys::Win32::UI::Input::XboxController::{
    XInputGetState, XINPUT_GAMEPAD_A, XINPUT_GAMEPAD_B, XINPUT_GAMEPAD_BACK,
    XINPUT_GAMEPAD_DPAD_DOWN, XINPUT_GAMEPAD_DPAD_LEFT, XINPUT_GAMEPAD_DPAD_RIGHT,
    XINPUT_GAMEPAD_DPAD_UP, XINPUT_GAMEPAD_LEFT_SHOULDER, XINPUT_GAMEPAD_LEFT_THUMB,
    XINPUT_GAMEPAD_RIGHT_SHOULDER, XINPUT_GAMEPAD_RIGHT_THUMB, XINPUT_GAMEPAD_START,
    XINPUT_GAMEPAD_X, XINPUT_GAMEPAD_Y, XINPUT_STATE,
};

/// XInput serves controller slots 0..4.
const MAX_SLOTS: u32 = 4;

/// XInput-backed controller (slot 0-3).
pub struct XInputBackend {
    slot: u32,
    name: String,
}

impl XInputBackend {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            name: format!("xinput:{slot}"),
        }
    }

    fn read_slot(&self) -> Snapshot {
        // FFI struct: must be manually zeroed.
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };

        // NOTE: XInputGetState returns 0 on success.
        let res = unsafe { XInputGetState(self.slot, &mut state) };
        if res != 0 {
            // Disconnected or empty slot.
            return Snapshot::disconnected();
        }

        let gp = state.Gamepad;
        let held = |mask: u16| gp.wButtons & mask != 0;

        Snapshot {
            connected: true,
            buttons: Buttons {
                a: held(XINPUT_GAMEPAD_A),
                b: held(XINPUT_GAMEPAD_B),
                x: held(XINPUT_GAMEPAD_X),
                y: held(XINPUT_GAMEPAD_Y),
                lb: held(XINPUT_GAMEPAD_LEFT_SHOULDER),
                rb: held(XINPUT_GAMEPAD_RIGHT_SHOULDER),
                back: held(XINPUT_GAMEPAD_BACK),
                start: held(XINPUT_GAMEPAD_START),
                ls: held(XINPUT_GAMEPAD_LEFT_THUMB),
                rs: held(XINPUT_GAMEPAD_RIGHT_THUMB),
                dpad_up: held(XINPUT_GAMEPAD_DPAD_UP),
                dpad_down: held(XINPUT_GAMEPAD_DPAD_DOWN),
                dpad_left: held(XINPUT_GAMEPAD_DPAD_LEFT),
                dpad_right: held(XINPUT_GAMEPAD_DPAD_RIGHT),
            },
            triggers: Triggers {
                lt: normalize_trigger(gp.bLeftTrigger),
                rt: normalize_trigger(gp.bRightTrigger),
            },
            sticks: Sticks {
                lx: normalize_thumb(gp.sThumbLX),
                ly: normalize_thumb(gp.sThumbLY),
                rx: normalize_thumb(gp.sThumbRX),
                ry: normalize_thumb(gp.sThumbRY),
            },
        }
    }
}

impl InputBackend for XInputBackend {
    fn init(&mut self) -> Result<()> {
        // XInput is linked into the process; the slot index is the only
        // thing that can be wrong before the first poll.
        if self.slot >= MAX_SLOTS {
            return Err(Error::Backend(format!(
                "xinput slot {} out of range (0-3)",
                self.slot
            )));
        }
        Ok(())
    }

    fn poll(&mut self) -> Snapshot {
        self.read_slot()
    }

    fn shutdown(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}
