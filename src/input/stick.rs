//! Circle pad and C-stick channels.
//!
//! Deflection is not encoded proportionally: a stick is either centered (its
//! neutral sentinel) or deflected (a literal zero field).

pub const CIRCLE_PAD_NEUTRAL: u32 = 0x007F_F7FF;
pub const CSTICK_NEUTRAL: u32 = 0x8080_0081;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    CirclePad,
    CStick,
}

impl Stick {
    pub fn neutral(self) -> u32 {
        match self {
            Stick::CirclePad => CIRCLE_PAD_NEUTRAL,
            Stick::CStick => CSTICK_NEUTRAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickState {
    stick: Stick,
    x: i16,
    y: i16,
}

impl StickState {
    pub fn new(stick: Stick) -> Self {
        Self { stick, x: 0, y: 0 }
    }

    pub fn circle_pad() -> Self {
        Self::new(Stick::CirclePad)
    }

    pub fn cstick() -> Self {
        Self::new(Stick::CStick)
    }

    pub fn stick(&self) -> Stick {
        self.stick
    }

    pub fn set(&mut self, x: i16, y: i16) {
        self.x = x;
        self.y = y;
    }

    pub fn reset(&mut self) {
        self.set(0, 0);
    }

    pub fn is_centered(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn wire_value(&self) -> u32 {
        if self.is_centered() {
            self.stick.neutral()
        } else {
            0
        }
    }
}
