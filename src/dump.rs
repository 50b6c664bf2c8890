//! Print the frame an input state encodes to, for checking against a peer.
//! Run: n3ds-pad dump --button a --touch 100 200

use std::io::Write;

use crate::frame::{self, FrameFields};
use crate::input::{Button, InputState, TouchPoint};

pub fn state_for(button: Option<Button>, touch: Option<TouchPoint>) -> InputState {
    let mut state = InputState::new();
    if let Some(button) = button {
        state.buttons.set(button, true);
    }
    if let Some(p) = touch {
        state.touch.set(p.x, p.y);
    }
    state
}

pub fn run_dump<W: Write>(
    state: &InputState,
    mut out: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let frame = state.frame();
    let fields = FrameFields::parse(&frame).ok_or("frame has wrong length")?;
    writeln!(out, "{}", fields)?;
    writeln!(out, "bytes      {}", frame::to_hex(&frame))?;
    Ok(())
}
