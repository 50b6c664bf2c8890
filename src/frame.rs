//! Fixed 20-byte input redirection payload.
//!
//! Field order is buttons, touch, circle pad, C-stick, special buttons. Every
//! field is a little-endian u32.

use std::fmt;

use crate::input::{DigitalButtons, SpecialButtons, StickState, TouchState};

pub const FIELD_SIZE: usize = 4;
pub const FRAME_SIZE: usize = 5 * FIELD_SIZE;

pub type Frame = [u8; FRAME_SIZE];

const BUTTONS_OFFSET: usize = 0;
const TOUCH_OFFSET: usize = 4;
const CIRCLE_PAD_OFFSET: usize = 8;
const CSTICK_OFFSET: usize = 12;
const SPECIAL_OFFSET: usize = 16;

pub fn build_frame(
    buttons: &DigitalButtons,
    touch: &TouchState,
    circle_pad: &StickState,
    cstick: &StickState,
    special: &SpecialButtons,
) -> Frame {
    let mut buf = [0u8; FRAME_SIZE];
    put_field(&mut buf, BUTTONS_OFFSET, buttons.wire_value());
    put_field(&mut buf, TOUCH_OFFSET, touch.wire_value());
    put_field(&mut buf, CIRCLE_PAD_OFFSET, circle_pad.wire_value());
    put_field(&mut buf, CSTICK_OFFSET, cstick.wire_value());
    put_field(&mut buf, SPECIAL_OFFSET, special.wire_value());
    buf
}

fn put_field(buf: &mut Frame, offset: usize, value: u32) {
    buf[offset..offset + FIELD_SIZE].copy_from_slice(&value.to_le_bytes());
}

fn get_field(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// The five raw fields of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFields {
    pub buttons: u32,
    pub touch: u32,
    pub circle_pad: u32,
    pub cstick: u32,
    pub special: u32,
}

impl FrameFields {
    /// Split a payload into its fields. Returns None unless `buf` is exactly one frame.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() != FRAME_SIZE {
            return None;
        }
        Some(Self {
            buttons: get_field(buf, BUTTONS_OFFSET),
            touch: get_field(buf, TOUCH_OFFSET),
            circle_pad: get_field(buf, CIRCLE_PAD_OFFSET),
            cstick: get_field(buf, CSTICK_OFFSET),
            special: get_field(buf, SPECIAL_OFFSET),
        })
    }
}

impl fmt::Display for FrameFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "buttons    0x{:08X}", self.buttons)?;
        writeln!(f, "touch      0x{:08X}", self.touch)?;
        writeln!(f, "circle pad 0x{:08X}", self.circle_pad)?;
        writeln!(f, "c-stick    0x{:08X}", self.cstick)?;
        write!(f, "special    0x{:08X}", self.special)
    }
}

pub fn to_hex(frame: &Frame) -> String {
    frame
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
