//! Touch screen channel.

use serde::Deserialize;

/// Largest coordinate on either touch axis.
pub const TOUCH_MAX: u16 = 4095;

/// Wire value for "touch screen inactive". Not the same as touching at (0, 0).
pub const TOUCH_NEUTRAL: u32 = 0x0200_0000;

const TOUCH_ACTIVE_BIT: u32 = 1 << 24;

/// A position in protocol touch units (0..=4095 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    /// Scale a pixel position on a `width`×`height` screen to touch units.
    pub fn from_screen(px: u32, py: u32, width: u32, height: u32) -> Self {
        Self {
            x: scale_axis(px, width),
            y: scale_axis(py, height),
        }
    }
}

fn scale_axis(pixel: u32, extent: u32) -> u16 {
    if extent == 0 {
        return 0;
    }
    let scaled = u64::from(pixel) * u64::from(TOUCH_MAX + 1) / u64::from(extent);
    scaled.min(u64::from(TOUCH_MAX)) as u16
}

/// A screen pixel as written in the bindings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenPoint {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchState {
    touching: bool,
    x: u16,
    y: u16,
}

impl TouchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start touching at `(x, y)`. Callers validate the range.
    pub fn set(&mut self, x: u16, y: u16) {
        self.touching = true;
        self.x = x;
        self.y = y;
    }

    pub fn reset(&mut self) {
        self.touching = false;
        self.x = 0;
        self.y = 0;
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn wire_value(&self) -> u32 {
        if self.touching {
            u32::from(self.x) | (u32::from(self.y) << 12) | TOUCH_ACTIVE_BIT
        } else {
            TOUCH_NEUTRAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_neutral_sentinel() {
        let mut touch = TouchState::new();
        touch.set(1234, 567);
        touch.reset();
        assert_eq!(touch.wire_value(), 0x0200_0000);
        assert!(!touch.is_touching());
    }

    #[test]
    fn test_touching_encoding() {
        let mut touch = TouchState::new();
        touch.reset();
        touch.set(100, 200);
        assert_eq!(touch.wire_value(), 100 | (200 << 12) | (1 << 24));
    }

    #[test]
    fn test_touch_at_origin_differs_from_neutral() {
        let mut touch = TouchState::new();
        touch.set(0, 0);
        assert_eq!(touch.wire_value(), 1 << 24);
        assert_ne!(touch.wire_value(), TOUCH_NEUTRAL);
    }

    #[test]
    fn test_max_coordinates() {
        let mut touch = TouchState::new();
        touch.set(TOUCH_MAX, TOUCH_MAX);
        assert_eq!(touch.wire_value(), 0x01FF_FFFF);
    }

    #[test]
    fn test_from_screen() {
        assert_eq!(TouchPoint::from_screen(0, 0, 320, 240), TouchPoint { x: 0, y: 0 });
        assert_eq!(
            TouchPoint::from_screen(160, 120, 320, 240),
            TouchPoint { x: 2048, y: 2048 }
        );
        // Far edge would be 4096, clamped into range
        assert_eq!(
            TouchPoint::from_screen(320, 240, 320, 240),
            TouchPoint { x: TOUCH_MAX, y: TOUCH_MAX }
        );
        assert_eq!(TouchPoint::from_screen(10, 10, 0, 0), TouchPoint { x: 0, y: 0 });
    }
}
