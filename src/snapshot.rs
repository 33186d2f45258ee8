//! Controller state snapshots and their wire encoding.
//!
//! [`Snapshot`] is an **owned**, immutable reading of the full controller
//! state at one poll tick. It is produced once per tick by the input
//! backend and never mutated afterward; threads share it behind an `Arc`,
//! so only the bus slot holding the current reference needs a lock.
//!
//! # Semantics
//! - Axes are normalized: sticks in `[-1.0, 1.0]`, triggers in `[0.0, 1.0]`.
//! - When `connected` is `false`, every other field holds its neutral
//!   default, never a stale value from a previous read.
//!   `Snapshot::default()` *is* the disconnected snapshot.
//!
//! # Wire format
//! One JSON object per snapshot, UTF-8, followed by a single `\n`:
//!
//! ```json
//! {"connected":true,
//!  "buttons":{"A":0,"B":0,"X":0,"Y":0,"LB":0,"RB":0,"Back":0,"Start":0,
//!             "LS":0,"RS":0,"DpadUp":0,"DpadDown":0,"DpadLeft":0,"DpadRight":0},
//!  "triggers":{"LT":0.0,"RT":0.0},
//!  "sticks":{"LX":0.0,"LY":0.0,"RX":0.0,"RY":0.0}}
//! ```
//!
//! Buttons travel as `0|1` integers. Field names are stable; consumers must
//! ignore unknown future fields (the default decode behavior here).

use serde::{Deserialize, Serialize};

/// Button states serialized as `0|1` on the wire.
mod bit {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        u8::deserialize(d).map(|v| v != 0)
    }
}

/// Named digital button flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    #[serde(rename = "A", with = "bit")]
    pub a: bool,
    #[serde(rename = "B", with = "bit")]
    pub b: bool,
    #[serde(rename = "X", with = "bit")]
    pub x: bool,
    #[serde(rename = "Y", with = "bit")]
    pub y: bool,
    #[serde(rename = "LB", with = "bit")]
    pub lb: bool,
    #[serde(rename = "RB", with = "bit")]
    pub rb: bool,
    #[serde(rename = "Back", with = "bit")]
    pub back: bool,
    #[serde(rename = "Start", with = "bit")]
    pub start: bool,
    #[serde(rename = "LS", with = "bit")]
    pub ls: bool,
    #[serde(rename = "RS", with = "bit")]
    pub rs: bool,
    #[serde(rename = "DpadUp", with = "bit")]
    pub dpad_up: bool,
    #[serde(rename = "DpadDown", with = "bit")]
    pub dpad_down: bool,
    #[serde(rename = "DpadLeft", with = "bit")]
    pub dpad_left: bool,
    #[serde(rename = "DpadRight", with = "bit")]
    pub dpad_right: bool,
}

/// Analog trigger positions in `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(rename = "LT")]
    pub lt: f32,
    #[serde(rename = "RT")]
    pub rt: f32,
}

/// Thumbstick positions in `[-1.0, 1.0]`, two 2-axis pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sticks {
    #[serde(rename = "LX")]
    pub lx: f32,
    #[serde(rename = "LY")]
    pub ly: f32,
    #[serde(rename = "RX")]
    pub rx: f32,
    #[serde(rename = "RY")]
    pub ry: f32,
}

/// One immutable reading of the full controller state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub connected: bool,
    pub buttons: Buttons,
    pub triggers: Triggers,
    pub sticks: Sticks,
}

impl Snapshot {
    /// The neutral snapshot reported while no controller is present.
    pub fn disconnected() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            connected: true,
            buttons: Buttons {
                a: true,
                rb: true,
                dpad_left: true,
                ..Buttons::default()
            },
            triggers: Triggers { lt: 0.25, rt: 1.0 },
            sticks: Sticks {
                lx: -1.0,
                ly: 0.5,
                rx: 0.333,
                ry: -0.125,
            },
        }
    }

    #[test]
    fn disconnected_snapshot_is_all_neutral() {
        let snap = Snapshot::disconnected();
        assert!(!snap.connected);
        assert_eq!(snap.buttons, Buttons::default());
        assert_eq!(snap.triggers.lt, 0.0);
        assert_eq!(snap.triggers.rt, 0.0);
        assert_eq!(snap.sticks.lx, 0.0);
        assert_eq!(snap.sticks.ly, 0.0);
        assert_eq!(snap.sticks.rx, 0.0);
        assert_eq!(snap.sticks.ry, 0.0);
    }

    #[test]
    fn wire_shape_matches_declared_format() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["connected"], serde_json::json!(true));

        // Buttons are 0|1 integers under their stable names.
        let buttons = value["buttons"].as_object().unwrap();
        let expected = [
            "A", "B", "X", "Y", "LB", "RB", "Back", "Start", "LS", "RS", "DpadUp", "DpadDown",
            "DpadLeft", "DpadRight",
        ];
        assert_eq!(buttons.len(), expected.len());
        for name in expected {
            let v = buttons[name].as_u64().unwrap();
            assert!(v == 0 || v == 1, "{name} should be 0|1, got {v}");
        }
        assert_eq!(buttons["A"], 1);
        assert_eq!(buttons["RB"], 1);
        assert_eq!(buttons["DpadLeft"], 1);
        assert_eq!(buttons["B"], 0);

        for name in ["LT", "RT"] {
            assert!(value["triggers"][name].is_number());
        }
        for name in ["LX", "LY", "RX", "RY"] {
            assert!(value["sticks"][name].is_number());
        }
    }

    #[test]
    fn round_trip_preserves_values() {
        let original = sample();
        let text = serde_json::to_string(&original).unwrap();
        let decoded: Snapshot = serde_json::from_str(&text).unwrap();

        assert_eq!(decoded.connected, original.connected);
        assert_eq!(decoded.buttons, original.buttons);
        let tol = 1e-6_f32;
        assert!((decoded.triggers.lt - original.triggers.lt).abs() < tol);
        assert!((decoded.triggers.rt - original.triggers.rt).abs() < tol);
        assert!((decoded.sticks.lx - original.sticks.lx).abs() < tol);
        assert!((decoded.sticks.ly - original.sticks.ly).abs() < tol);
        assert!((decoded.sticks.rx - original.sticks.rx).abs() < tol);
        assert!((decoded.sticks.ry - original.sticks.ry).abs() < tol);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let text = r#"{
            "connected": true,
            "buttons": {"A":1,"B":0,"X":0,"Y":0,"LB":0,"RB":0,"Back":0,"Start":0,
                        "LS":0,"RS":0,"DpadUp":0,"DpadDown":0,"DpadLeft":0,"DpadRight":0,
                        "FutureButton":1},
            "triggers": {"LT":0.0,"RT":0.0},
            "sticks": {"LX":0.0,"LY":0.0,"RX":0.0,"RY":0.0},
            "protocol_rev": 2
        }"#;
        let decoded: Snapshot = serde_json::from_str(text).unwrap();
        assert!(decoded.connected);
        assert!(decoded.buttons.a);
    }
}
