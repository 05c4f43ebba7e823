//! Pixel-space and normalized bounding boxes
//!
//! Conversions between the two follow the YOLO convention: a normalized box is
//! a center and a size expressed as fractions of the canvas dimensions.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in integer pixel coordinates (`x2`/`y2` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelBox {
    /// Create a box from its two corners
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from its top-left corner and size
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, x + width as i32, y + height as i32)
    }

    /// Saturates instead of overflowing for corners near the `i32` limits
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Both extents are strictly positive
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Valid and fully inside `[0, width] x [0, height]`
    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.is_valid()
            && self.x1 >= 0
            && self.y1 >= 0
            && i64::from(self.x2) <= i64::from(width)
            && i64::from(self.y2) <= i64::from(height)
    }

    /// Normalize against a canvas of `width` x `height` pixels
    pub fn to_normalized(&self, class_id: u32, width: u32, height: u32) -> NormalizedBox {
        NormalizedBox::from_pixel(self, class_id, width, height)
    }
}

/// Box in label space: every geometric field is a fraction of the canvas size.
///
/// Values slightly outside `[0, 1]` are tolerated on read; clamping only
/// happens when a canvas size is known (see [`NormalizedBox::clamped`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(class_id: u32, x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            class_id,
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Normalize a pixel box against a canvas of `canvas_w` x `canvas_h`
    pub fn from_pixel(bbox: &PixelBox, class_id: u32, canvas_w: u32, canvas_h: u32) -> Self {
        let w = f64::from(canvas_w);
        let h = f64::from(canvas_h);
        let (x1, y1) = (f64::from(bbox.x1), f64::from(bbox.y1));
        let (x2, y2) = (f64::from(bbox.x2), f64::from(bbox.y2));
        Self {
            class_id,
            x_center: (x1 + x2) / 2.0 / w,
            y_center: (y1 + y2) / 2.0 / h,
            width: (x2 - x1) / w,
            height: (y2 - y1) / h,
        }
    }

    /// Scale back to pixels.
    ///
    /// Each corner is truncated toward zero, so a decode/encode cycle of an
    /// integer box may move a corner by at most one pixel.
    pub fn to_pixel(&self, canvas_w: u32, canvas_h: u32) -> PixelBox {
        let w = f64::from(canvas_w);
        let h = f64::from(canvas_h);
        PixelBox {
            x1: ((self.x_center - self.width / 2.0) * w) as i32,
            y1: ((self.y_center - self.height / 2.0) * h) as i32,
            x2: ((self.x_center + self.width / 2.0) * w) as i32,
            y2: ((self.y_center + self.height / 2.0) * h) as i32,
        }
    }

    /// Clip the box extents to the unit square, keeping the class id
    pub fn clamped(&self) -> Self {
        let x1 = (self.x_center - self.width / 2.0).clamp(0.0, 1.0);
        let x2 = (self.x_center + self.width / 2.0).clamp(0.0, 1.0);
        let y1 = (self.y_center - self.height / 2.0).clamp(0.0, 1.0);
        let y2 = (self.y_center + self.height / 2.0).clamp(0.0, 1.0);
        Self::new(
            self.class_id,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0,
            x2 - x1,
            y2 - y1,
        )
    }
}

/// A realized placement: pixel box plus the class it is labeled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledBox {
    pub class_id: u32,
    pub bbox: PixelBox,
}

impl LabeledBox {
    pub fn new(class_id: u32, bbox: PixelBox) -> Self {
        Self { class_id, bbox }
    }

    pub fn to_normalized(&self, canvas_w: u32, canvas_h: u32) -> NormalizedBox {
        self.bbox.to_normalized(self.class_id, canvas_w, canvas_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_box_round_trip_within_one_pixel() {
        let original = PixelBox::new(100, 50, 300, 250);
        let normalized = original.to_normalized(0, 800, 600);
        let back = normalized.to_pixel(800, 600);

        assert!((back.x1 - original.x1).abs() <= 1);
        assert!((back.y1 - original.y1).abs() <= 1);
        assert!((back.x2 - original.x2).abs() <= 1);
        assert!((back.y2 - original.y2).abs() <= 1);
    }

    #[test]
    fn test_to_pixel_truncates() {
        // 0.5 +- 0.0999 on a 10px canvas gives 4.001 and 5.999
        let b = NormalizedBox::new(0, 0.5, 0.5, 0.1998, 0.1998);
        assert_eq!(b.to_pixel(10, 10), PixelBox::new(4, 4, 5, 5));
    }

    #[test]
    fn test_extreme_corners_do_not_overflow() {
        // a corrupt label with an absurd width saturates both corners
        let b = NormalizedBox::new(0, 0.5, 0.5, 10_000_000.0, 0.1).to_pixel(800, 600);
        assert_eq!((b.x1, b.x2), (i32::MIN, i32::MAX));
        assert_eq!(b.width(), i32::MAX);
        assert!(!b.is_inside(800, 600));

        let n = NormalizedBox::from_pixel(&b, 0, 800, 600);
        assert!(n.width.is_finite() && n.width > 1.0);
    }

    #[test]
    fn test_is_inside() {
        assert!(PixelBox::new(0, 0, 800, 600).is_inside(800, 600));
        assert!(!PixelBox::new(0, 0, 801, 600).is_inside(800, 600));
        assert!(!PixelBox::new(-1, 0, 10, 10).is_inside(800, 600));
        assert!(!PixelBox::new(10, 10, 10, 20).is_inside(800, 600));
    }

    #[test]
    fn test_clamped_trims_overhang() {
        let b = NormalizedBox::new(3, 0.95, 0.5, 0.2, 0.2).clamped();
        assert_eq!(b.class_id, 3);
        assert!((b.x_center - 0.925).abs() < 1e-9);
        assert!((b.width - 0.15).abs() < 1e-9);
        assert!((b.height - 0.2).abs() < 1e-9);
    }
}
