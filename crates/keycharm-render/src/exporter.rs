//! Snapshot exporter.
//!
//! Captures the committed composition into PNG bytes, coordinating the
//! "capturing" UI mode. Capture failures are recoverable: callers get
//! `None` and proceed without a thumbnail.

use crate::compositor::composite;
use crate::graphics::GraphicStore;
use image::RgbaImage;
use keycharm_core::builder::Composer;
use peniko::Color;
use thiserror::Error;

/// Snapshot pipeline errors. None of these escalate past the exporter.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("graphic for item {0} is not loaded")]
    MissingGraphic(String),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("png encode failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Tunable capture parameters. Neither is a compatibility contract.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotOptions {
    /// Output pixels per logical unit. Sub-unit by default: thumbnails do
    /// not need full resolution and capture cost scales with area.
    pub scale: f64,
    /// Background fill; rendered opaque regardless of its alpha.
    pub background: Color,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            scale: 0.5,
            background: Color::WHITE,
        }
    }
}

impl SnapshotOptions {
    /// Set the capture scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the background fill.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// Produces the deterministic PNG snapshot of a composition.
#[derive(Debug, Clone, Default)]
pub struct SnapshotExporter {
    options: SnapshotOptions,
    capturing: bool,
}

impl SnapshotExporter {
    /// Create an exporter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter with explicit options.
    pub fn with_options(options: SnapshotOptions) -> Self {
        Self {
            options,
            capturing: false,
        }
    }

    /// Whether a capture is in progress. UI layers hide the selection
    /// outline, per-item overlays and the resize handle while this is true.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Capture the current composition.
    ///
    /// Blocks on graphic decode, rasters the committed placement at the
    /// configured scale over an opaque background, and encodes PNG bytes.
    /// The capturing flag is restored on success and failure alike; a
    /// failed capture returns `None` and is only logged.
    pub fn capture(&mut self, composer: &Composer, store: &mut GraphicStore) -> Option<Vec<u8>> {
        self.capturing = true;
        let result = render(composer, store, self.options);
        self.capturing = false;

        match result {
            Ok(png_data) => {
                log::debug!("snapshot captured ({} bytes)", png_data.len());
                Some(png_data)
            }
            Err(e) => {
                log::warn!("snapshot capture failed: {e}");
                None
            }
        }
    }
}

fn render(
    composer: &Composer,
    store: &mut GraphicStore,
    options: SnapshotOptions,
) -> Result<Vec<u8>, SnapshotError> {
    // Graphics must finish decoding before sampling, or covered regions
    // come out blank.
    store.decode_all()?;

    let rgba = composite(
        composer.placement().items(),
        store,
        composer.canvas_height(),
        options.scale,
        options.background,
    )?;
    Ok(encode_png(&rgba)?)
}

/// Encode RGBA pixel data to PNG bytes.
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, png::EncodingError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use keycharm_core::catalog::{ImageRef, ItemDescriptor};

    fn descriptor(id: &str) -> ItemDescriptor {
        ItemDescriptor {
            catalog_item_id: id.to_string(),
            display_name: id.to_string(),
            unit_price: 1.0,
            image: ImageRef::Url(format!("{id}.png")),
            display_width: 100.0,
        }
    }

    #[test]
    fn test_capture_empty_composition() {
        let composer = Composer::new();
        let mut store = GraphicStore::new();
        let mut exporter = SnapshotExporter::new();

        let png_data = exporter.capture(&composer, &mut store).unwrap();
        assert!(!exporter.is_capturing());
        // PNG magic bytes.
        assert_eq!(&png_data[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_capture_success_resets_flag() {
        let mut composer = Composer::new();
        composer.add_item(descriptor("star"));
        let mut store = GraphicStore::new();
        store.insert_image("star", image::RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])));
        let mut exporter = SnapshotExporter::new();

        assert!(exporter.capture(&composer, &mut store).is_some());
        assert!(!exporter.is_capturing());
    }

    #[test]
    fn test_capture_failure_returns_none_and_resets_flag() {
        let mut composer = Composer::new();
        composer.add_item(descriptor("missing"));
        let mut store = GraphicStore::new();
        let mut exporter = SnapshotExporter::new();

        assert!(exporter.capture(&composer, &mut store).is_none());
        assert!(!exporter.is_capturing());
    }

    #[test]
    fn test_capture_failure_on_undecodable_bytes() {
        let mut composer = Composer::new();
        composer.add_item(descriptor("junk"));
        let mut store = GraphicStore::new();
        store.insert_bytes("junk", vec![1, 2, 3]);
        let mut exporter = SnapshotExporter::new();

        assert!(exporter.capture(&composer, &mut store).is_none());
        assert!(!exporter.is_capturing());
    }

    #[test]
    fn test_options_control_output_size() {
        let composer = Composer::new();
        let mut store = GraphicStore::new();
        let mut exporter =
            SnapshotExporter::with_options(SnapshotOptions::default().with_scale(1.0));

        let png_data = exporter.capture(&composer, &mut store).unwrap();
        let decoded = image::load_from_memory(&png_data).unwrap();
        assert_eq!(decoded.width(), 450);
        assert_eq!(decoded.height(), composer.canvas_height() as u32);
    }
}
