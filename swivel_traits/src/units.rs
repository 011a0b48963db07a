//! Typed geometry units shared between the coordinator and its collaborators.
//!
//! Layout geometry (scroll positions, content sizes, viewport rects) is
//! expressed in `LayoutPixel` units; the compositing side deals in
//! `DevicePixel`. Keeping the two apart with euclid unit tags makes it a type
//! error to hand an unscaled layout length to the device-pixel side.

use euclid::{Point2D, Rect, Scale, Size2D, Vector2D};
use serde::{Deserialize, Serialize};

/// CSS layout coordinate space, before device scaling.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LayoutPixel;

/// Physical pixel coordinate space of the display.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DevicePixel;

pub type LayoutPoint = Point2D<f32, LayoutPixel>;
pub type LayoutSize = Size2D<f32, LayoutPixel>;
pub type LayoutRect = Rect<f32, LayoutPixel>;
pub type LayoutVector2D = Vector2D<f32, LayoutPixel>;

/// Device pixels per layout pixel.
pub type DeviceScale = Scale<f32, LayoutPixel, DevicePixel>;

/// Snaps a layout-unit length to the device pixel grid.
///
/// Non-antialiased rounding lands on whole device pixels; antialiased
/// rounding lands on half-pixel centers. Snap-point geometry always uses the
/// non-antialiased form, because snap offsets must be pixel-exact.
pub fn round_to_device_pixel(value: f32, device_scale: DeviceScale, antialiased: bool) -> f32 {
    let scale = device_scale.get();
    debug_assert!(scale > 0.0);
    if antialiased {
        ((value * scale - 0.5).round() + 0.5) / scale
    } else {
        (value * scale).round() / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_device_pixel() {
        let scale = DeviceScale::new(2.0);
        assert_eq!(round_to_device_pixel(10.3, scale, false), 10.5);
        assert_eq!(round_to_device_pixel(10.2, scale, false), 10.0);
        assert_eq!(round_to_device_pixel(-3.3, scale, false), -3.5);

        // Antialiased rounding targets half-pixel centers.
        assert_eq!(round_to_device_pixel(10.3, scale, true), 10.25);

        let identity = DeviceScale::new(1.0);
        assert_eq!(round_to_device_pixel(10.4, identity, false), 10.0);
        assert_eq!(round_to_device_pixel(10.6, identity, false), 11.0);
    }
}
