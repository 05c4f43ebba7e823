//! Drawing helpers for previews

use cardsynth_core::PixelBox;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Outline `bbox` with a border `thickness` pixels wide, drawn inwards
    pub fn draw_box(canvas: &mut RgbaImage, bbox: &PixelBox, color: Rgba<u8>, thickness: u32) {
        for inset in 0..thickness.max(1) as i32 {
            let width = bbox.width() - 2 * inset;
            let height = bbox.height() - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }

            let rect =
                Rect::at(bbox.x1 + inset, bbox.y1 + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }

    /// Outline every box
    pub fn draw_boxes(canvas: &mut RgbaImage, boxes: &[PixelBox], color: Rgba<u8>, thickness: u32) {
        for bbox in boxes {
            Self::draw_box(canvas, bbox, color, thickness);
        }
    }
}
