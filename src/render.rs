//! Console dashboard rendering.
//!
//! Leaf collaborator of the poll loop: turns one snapshot into the fixed
//! multi-line text frame shown to the operator. The whole frame is built
//! into a single string so the caller can write it in one call and repaint
//! in place without flicker.

use std::fmt::Write as _;

use crate::snapshot::Snapshot;

/// ANSI cursor home; the frame overwrites itself in place each tick.
pub const CURSOR_HOME: &str = "\x1b[H";
/// ANSI full clear, written once at startup.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

fn flag(v: bool) -> u8 {
    u8::from(v)
}

/// Build one dashboard frame.
pub fn dashboard(snap: &Snapshot, hz: u32, channel: &str) -> String {
    let b = &snap.buttons;
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "Gamepad Monitor ({hz} Hz)");
    let _ = writeln!(out, "Channel: {channel}    (Ctrl+C to exit)");
    out.push('\n');
    let _ = writeln!(
        out,
        "Connected: {}",
        if snap.connected { "Yes" } else { "No " }
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "Buttons:   A:{}  B:{}  X:{}  Y:{}",
        flag(b.a),
        flag(b.b),
        flag(b.x),
        flag(b.y)
    );
    let _ = writeln!(
        out,
        "           LB:{}  RB:{}  Back:{}  Start:{}",
        flag(b.lb),
        flag(b.rb),
        flag(b.back),
        flag(b.start)
    );
    let _ = writeln!(out, "           LS:{}  RS:{}", flag(b.ls), flag(b.rs));
    let _ = writeln!(
        out,
        "DPad:      Up:{}  Down:{}  Left:{}  Right:{}",
        flag(b.dpad_up),
        flag(b.dpad_down),
        flag(b.dpad_left),
        flag(b.dpad_right)
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "Triggers:  LT:{:5.3}   RT:{:5.3}",
        snap.triggers.lt, snap.triggers.rt
    );
    let _ = writeln!(
        out,
        "Sticks:    LX:{:7.3}  LY:{:7.3}   RX:{:7.3}  RY:{:7.3}",
        snap.sticks.lx, snap.sticks.ly, snap.sticks.rx, snap.sticks.ry
    );
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Buttons, Triggers};

    #[test]
    fn frame_reports_connection_and_values() {
        let snap = Snapshot {
            connected: true,
            buttons: Buttons {
                a: true,
                ..Buttons::default()
            },
            triggers: Triggers { lt: 1.0, rt: 0.0 },
            ..Snapshot::default()
        };
        let frame = dashboard(&snap, 10, "XboxReaderPipe");
        assert!(frame.contains("Gamepad Monitor (10 Hz)"));
        assert!(frame.contains("Channel: XboxReaderPipe"));
        assert!(frame.contains("Connected: Yes"));
        assert!(frame.contains("A:1"));
        assert!(frame.contains("B:0"));
        assert!(frame.contains("LT:1.000"));
    }

    #[test]
    fn disconnected_frame_shows_neutral_state() {
        let frame = dashboard(&Snapshot::disconnected(), 10, "XboxReaderPipe");
        assert!(frame.contains("Connected: No"));
        assert!(frame.contains("LX:  0.000"));
    }
}
