//! CPU compositor for the snapshot raster.
//!
//! Draws the composition back-to-front into an RGBA buffer: opaque
//! background fill, then each charm sampled through the inverse of its
//! rotation about its center, source-over blended.

use crate::exporter::SnapshotError;
use crate::graphics::GraphicStore;
use image::{Rgba, RgbaImage};
use keycharm_core::geometry::LOGICAL_WIDTH;
use keycharm_core::placement::PlacedItem;
use peniko::Color;

/// Rasterize `items` (committed paint order) into an RGBA image.
///
/// `scale` converts logical units to output pixels; the background is
/// forced opaque so the artifact composites cleanly downstream.
pub fn composite(
    items: &[PlacedItem],
    store: &GraphicStore,
    canvas_height: f64,
    scale: f64,
    background: Color,
) -> Result<RgbaImage, SnapshotError> {
    let width_px = (LOGICAL_WIDTH * scale).round().max(1.0) as u32;
    let height_px = (canvas_height * scale).round().max(1.0) as u32;

    let bg = background.to_rgba8();
    let mut out = RgbaImage::from_pixel(width_px, height_px, Rgba([bg.r, bg.g, bg.b, 255]));

    for item in items {
        let src = store
            .get(&item.item.catalog_item_id)
            .ok_or_else(|| SnapshotError::MissingGraphic(item.item.catalog_item_id.clone()))?;
        draw_item(&mut out, item, src, scale);
    }

    Ok(out)
}

/// Blend one rotated charm into the output buffer.
fn draw_item(out: &mut RgbaImage, item: &PlacedItem, src: &RgbaImage, scale: f64) {
    let (src_w, src_h) = src.dimensions();
    if src_w == 0 || src_h == 0 {
        return;
    }

    // Destination footprint: display width in output pixels, height from
    // the source aspect, centered on the item position.
    let disp_w = item.item.display_width * scale;
    let disp_h = disp_w * (src_h as f64 / src_w as f64);
    if disp_w < 0.5 || disp_h < 0.5 {
        return;
    }
    let (half_w, half_h) = (disp_w / 2.0, disp_h / 2.0);
    let cx = item.position.x * scale;
    let cy = item.position.y * scale;

    let theta = item.rotation_degrees.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();

    // Axis-aligned bounds of the rotated rect, clipped to the canvas.
    let extent_x = half_w * cos_t.abs() + half_h * sin_t.abs();
    let extent_y = half_w * sin_t.abs() + half_h * cos_t.abs();
    let x0 = ((cx - extent_x).floor().max(0.0)) as u32;
    let y0 = ((cy - extent_y).floor().max(0.0)) as u32;
    let x1 = ((cx + extent_x).ceil().min(out.width() as f64)) as u32;
    let y1 = ((cy + extent_y).ceil().min(out.height() as f64)) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            // Rotate the destination offset back into the charm's local frame.
            let local_x = dx * cos_t + dy * sin_t;
            let local_y = -dx * sin_t + dy * cos_t;
            if local_x.abs() > half_w || local_y.abs() > half_h {
                continue;
            }
            let u = ((local_x + half_w) / disp_w * src_w as f64) as u32;
            let v = ((local_y + half_h) / disp_h * src_h as f64) as u32;
            let sample = *src.get_pixel(u.min(src_w - 1), v.min(src_h - 1));
            let base = *out.get_pixel(px, py);
            out.put_pixel(px, py, blend_over(base, sample));
        }
    }
}

/// Source-over alpha blend of `top` onto `base`.
fn blend_over(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let top_a = top[3] as f32 / 255.0;
    if top_a <= 0.0 {
        return base;
    }
    if top_a >= 1.0 {
        return top;
    }
    let base_a = base[3] as f32 / 255.0;
    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |t: u8, b: u8| -> u8 {
        let blended = (t as f32 * top_a + b as f32 * base_a * (1.0 - top_a)) / out_a;
        blended.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(top[0], base[0]),
        channel(top[1], base[1]),
        channel(top[2], base[2]),
        (out_a * 255.0).round() as u8,
    ])
}
