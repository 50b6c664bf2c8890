//! Digital and special button channels.
//!
//! Digital buttons are sent active-low: the wire value is the complement of the
//! internal "pressed" mask. Special buttons are active-high.

use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Pad buttons as laid out in the HID field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HidButtons: u32 {
        const A      = 1 << 0;
        const B      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const RIGHT  = 1 << 4;
        const LEFT   = 1 << 5;
        const UP     = 1 << 6;
        const DOWN   = 1 << 7;
        const R      = 1 << 8;
        const L      = 1 << 9;
        const X      = 1 << 10;
        const Y      = 1 << 11;
    }
}

bitflags! {
    /// Buttons outside the HID pad, packed low bit first.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpecialFlags: u32 {
        const HOME       = 1 << 0;
        const POWER      = 1 << 1;
        const POWER_LONG = 1 << 2;
    }
}

/// Internal pressed-mask the peer expects for an idle pad. Complemented on the wire.
pub const HID_NEUTRAL_MASK: u32 = 0xFFFF_F000;

/// A single digital pad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
    X,
    Y,
}

impl Button {
    pub const ALL: [Button; 12] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::R,
        Button::L,
        Button::X,
        Button::Y,
    ];

    pub fn flag(self) -> HidButtons {
        match self {
            Button::A => HidButtons::A,
            Button::B => HidButtons::B,
            Button::Select => HidButtons::SELECT,
            Button::Start => HidButtons::START,
            Button::Right => HidButtons::RIGHT,
            Button::Left => HidButtons::LEFT,
            Button::Up => HidButtons::UP,
            Button::Down => HidButtons::DOWN,
            Button::R => HidButtons::R,
            Button::L => HidButtons::L,
            Button::X => HidButtons::X,
            Button::Y => HidButtons::Y,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::A => "a",
            Button::B => "b",
            Button::Select => "select",
            Button::Start => "start",
            Button::Right => "right",
            Button::Left => "left",
            Button::Up => "up",
            Button::Down => "down",
            Button::R => "r",
            Button::L => "l",
            Button::X => "x",
            Button::Y => "y",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" => Ok(Button::A),
            "b" => Ok(Button::B),
            "select" => Ok(Button::Select),
            "start" => Ok(Button::Start),
            "right" | "dright" | "d-right" => Ok(Button::Right),
            "left" | "dleft" | "d-left" => Ok(Button::Left),
            "up" | "dup" | "d-up" => Ok(Button::Up),
            "down" | "ddown" | "d-down" => Ok(Button::Down),
            "r" => Ok(Button::R),
            "l" => Ok(Button::L),
            "x" => Ok(Button::X),
            "y" => Ok(Button::Y),
            _ => Err(format!(
                "Invalid button '{}'. Valid values: a, b, select, start, right, left, up, down, r, l, x, y",
                s
            )),
        }
    }
}

/// Buttons outside the pad matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialButton {
    Home,
    Power,
    PowerLong,
}

impl SpecialButton {
    pub fn flag(self) -> SpecialFlags {
        match self {
            SpecialButton::Home => SpecialFlags::HOME,
            SpecialButton::Power => SpecialFlags::POWER,
            SpecialButton::PowerLong => SpecialFlags::POWER_LONG,
        }
    }
}

/// The HID pad channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalButtons {
    mask: u32,
}

impl DigitalButtons {
    pub fn new() -> Self {
        Self {
            mask: HID_NEUTRAL_MASK,
        }
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        let bits = button.flag().bits();
        if pressed {
            self.mask |= bits;
        } else {
            self.mask &= !bits;
        }
    }

    /// Back to the seeded neutral mask, which is not zero.
    pub fn reset(&mut self) {
        self.mask = HID_NEUTRAL_MASK;
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.mask & button.flag().bits() != 0
    }

    /// Active-low encoding of the pressed mask.
    pub fn wire_value(&self) -> u32 {
        !self.mask
    }
}

impl Default for DigitalButtons {
    fn default() -> Self {
        Self::new()
    }
}

/// Home / power channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialButtons {
    active: SpecialFlags,
}

impl SpecialButtons {
    pub fn new() -> Self {
        Self {
            active: SpecialFlags::empty(),
        }
    }

    pub fn set(&mut self, button: SpecialButton, active: bool) {
        self.active.set(button.flag(), active);
    }

    pub fn reset(&mut self) {
        self.active = SpecialFlags::empty();
    }

    pub fn wire_value(&self) -> u32 {
        self.active.bits()
    }
}

impl Default for SpecialButtons {
    fn default() -> Self {
        Self::new()
    }
}
