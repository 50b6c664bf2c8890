mod buttons;
mod stick;
mod touch;

pub use buttons::{
    Button, DigitalButtons, HidButtons, SpecialButton, SpecialButtons, SpecialFlags,
    HID_NEUTRAL_MASK,
};
pub use stick::{Stick, StickState, CIRCLE_PAD_NEUTRAL, CSTICK_NEUTRAL};
pub use touch::{ScreenPoint, TouchPoint, TouchState, TOUCH_MAX, TOUCH_NEUTRAL};

/// One instance of every input channel, in the state the next frame will carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub buttons: DigitalButtons,
    pub touch: TouchState,
    pub circle_pad: StickState,
    pub cstick: StickState,
    pub special: SpecialButtons,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buttons: DigitalButtons::new(),
            touch: TouchState::new(),
            circle_pad: StickState::circle_pad(),
            cstick: StickState::cstick(),
            special: SpecialButtons::new(),
        }
    }

    pub fn frame(&self) -> crate::frame::Frame {
        crate::frame::build_frame(
            &self.buttons,
            &self.touch,
            &self.circle_pad,
            &self.cstick,
            &self.special,
        )
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
