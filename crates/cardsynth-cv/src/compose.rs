//! Alpha compositing of a transformed sprite onto the canvas

use crate::assets::Image;
use crate::error::SkipReason;
use crate::transform::Transformed;
use cardsynth_core::PixelBox;
use image::{Rgba, RgbaImage};

/// Blends sprites into a canvas in place
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Blend `sprite` with its top-left corner at `(offset_x, offset_y)`.
    ///
    /// A sprite that would not fit entirely inside the canvas is rejected and
    /// the canvas is left untouched. On success the footprint is returned.
    pub fn place(
        &self,
        canvas: &mut Image,
        sprite: &Transformed,
        offset_x: i64,
        offset_y: i64,
    ) -> Result<PixelBox, SkipReason> {
        self.blend(canvas.as_rgba_mut(), &sprite.pixels, offset_x, offset_y)
    }

    /// Same as [`Compositor::place`] on raw buffers
    pub fn blend(
        &self,
        canvas: &mut RgbaImage,
        sprite: &RgbaImage,
        offset_x: i64,
        offset_y: i64,
    ) -> Result<PixelBox, SkipReason> {
        let (canvas_w, canvas_h) = canvas.dimensions();
        let (bound_w, bound_h) = sprite.dimensions();

        let overflow = offset_x < 0
            || offset_y < 0
            || offset_x + i64::from(bound_w) > i64::from(canvas_w)
            || offset_y + i64::from(bound_h) > i64::from(canvas_h);
        if overflow {
            return Err(SkipReason::PlacementOverflow {
                offset_x,
                offset_y,
                bound_w,
                bound_h,
                canvas_w,
                canvas_h,
            });
        }

        // fits, so both offsets are within u32
        let (ox, oy) = (offset_x as u32, offset_y as u32);
        for (x, y, src) in sprite.enumerate_pixels() {
            let dst = canvas.get_pixel_mut(ox + x, oy + y);
            blend_pixel(dst, src);
        }

        Ok(PixelBox::from_origin_size(
            offset_x as i32,
            offset_y as i32,
            bound_w,
            bound_h,
        ))
    }
}

/// `dst = (1 - a) * dst + a * src` on colour channels, `a = src.alpha / 255`.
/// The canvas alpha is not touched.
pub fn blend_pixel(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    let alpha = f64::from(src[3]) / 255.0;
    if alpha <= 0.0 {
        return;
    }

    for c in 0..3 {
        let v = (1.0 - alpha) * f64::from(dst[c]) + alpha * f64::from(src[c]);
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_overflow_rejected_and_canvas_untouched() {
        let mut canvas = RgbaImage::from_pixel(800, 600, BLUE);
        let before = canvas.clone();
        let sprite = RgbaImage::from_pixel(200, 200, Rgba([255, 0, 0, 255]));

        let result = Compositor::new().blend(&mut canvas, &sprite, 700, 500);
        assert!(matches!(result, Err(SkipReason::PlacementOverflow { .. })));
        assert_eq!(canvas.as_raw(), before.as_raw());
    }

    #[test]
    fn test_negative_offset_rejected() {
        let mut canvas = RgbaImage::from_pixel(10, 10, BLUE);
        let sprite = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        assert!(Compositor::new().blend(&mut canvas, &sprite, -1, 0).is_err());
        assert!(Compositor::new().blend(&mut canvas, &sprite, 0, -1).is_err());
    }

    #[test]
    fn test_exact_fit_accepted() {
        let mut canvas = RgbaImage::from_pixel(10, 10, BLUE);
        let sprite = RgbaImage::from_pixel(4, 3, Rgba([255, 0, 0, 255]));
        let bbox = Compositor::new().blend(&mut canvas, &sprite, 6, 7).unwrap();
        assert_eq!(bbox, PixelBox::new(6, 7, 10, 10));
    }

    #[test]
    fn test_opaque_sprite_replaces_colour() {
        let mut canvas = RgbaImage::from_pixel(6, 6, BLUE);
        let sprite = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));

        Compositor::new().blend(&mut canvas, &sprite, 2, 3).unwrap();
        for y in 3..5 {
            for x in 2..4 {
                assert_eq!(canvas.get_pixel(x, y), &Rgba([255, 0, 0, 255]));
            }
        }
        assert_eq!(canvas.get_pixel(0, 0), &BLUE);
    }

    #[test]
    fn test_transparent_sprite_leaves_canvas() {
        let mut canvas = RgbaImage::from_pixel(6, 6, Rgba([12, 34, 56, 200]));
        let before = canvas.clone();
        let sprite = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 0]));

        Compositor::new().blend(&mut canvas, &sprite, 1, 1).unwrap();
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_partial_alpha_keeps_canvas_alpha() {
        let mut dst = Rgba([0, 0, 255, 77]);
        blend_pixel(&mut dst, &Rgba([255, 0, 0, 51]));
        // a = 0.2
        assert_eq!(dst, Rgba([51, 0, 204, 77]));
    }
}
