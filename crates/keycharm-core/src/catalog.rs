//! Catalog item ingestion and normalization.
//!
//! The catalog collaborator hands over loosely-shaped descriptors (several
//! historical key names for the same concept, optional sizing metadata).
//! Everything is normalized here, once, into [`ItemDescriptor`]; the rest
//! of the engine never branches on field presence.

use crate::geometry::PIXELS_PER_CM;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display width (logical units) for items without physical sizing metadata.
pub const DEFAULT_ITEM_WIDTH: f64 = 120.0;

/// Catalog ingestion errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog item {0} has no image reference")]
    MissingImage(String),
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where an item's graphic comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    /// Remote or app-served image location; bytes are fetched by a collaborator.
    Url(String),
    /// Inline base64-encoded image payload.
    Inline(String),
}

impl ImageRef {
    /// Decode an inline payload to raw image bytes.
    pub fn inline_bytes(&self) -> Option<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        match self {
            ImageRef::Inline(data) => STANDARD.decode(data).ok(),
            ImageRef::Url(_) => None,
        }
    }
}

/// Raw catalog descriptor as the collaborator sends it.
///
/// Alternate keys for the image reference are accepted via aliases rather
/// than branching at use sites.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogItem {
    pub catalog_item_id: String,
    pub display_name: String,
    pub unit_price: f64,
    #[serde(default, alias = "image", alias = "imageUrl", alias = "img")]
    pub image_reference: Option<String>,
    #[serde(default, alias = "imageData")]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub physical_width_cm: Option<f64>,
    #[serde(default)]
    pub render_pixel_width: Option<f64>,
    #[serde(default)]
    pub render_image_width_px: Option<f64>,
}

impl RawCatalogItem {
    /// Parse a single raw descriptor from JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Normalized item descriptor consumed by the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub catalog_item_id: String,
    pub display_name: String,
    pub unit_price: f64,
    pub image: ImageRef,
    /// Width the item occupies on the canvas, in logical units.
    pub display_width: f64,
}

impl ItemDescriptor {
    /// Normalize a raw catalog descriptor.
    pub fn normalize(raw: RawCatalogItem) -> Result<Self, CatalogError> {
        let image = match (raw.image_base64, raw.image_reference) {
            (Some(data), _) => ImageRef::Inline(data),
            (None, Some(url)) => ImageRef::Url(url),
            (None, None) => return Err(CatalogError::MissingImage(raw.catalog_item_id)),
        };

        let display_width = sized_width(
            raw.physical_width_cm,
            raw.render_pixel_width,
            raw.render_image_width_px,
        )
        .unwrap_or(DEFAULT_ITEM_WIDTH);

        Ok(Self {
            catalog_item_id: raw.catalog_item_id,
            display_name: raw.display_name,
            unit_price: raw.unit_price,
            image,
            display_width,
        })
    }
}

/// Compute the display width from physical sizing metadata, when complete.
///
/// `target_px = physical_width_cm * PIXELS_PER_CM`, scaled onto the source
/// image width: `final = render_image_width_px * target_px / render_pixel_width`.
fn sized_width(
    physical_width_cm: Option<f64>,
    render_pixel_width: Option<f64>,
    render_image_width_px: Option<f64>,
) -> Option<f64> {
    let physical = physical_width_cm?;
    let render_px = render_pixel_width?;
    let image_px = render_image_width_px?;
    if render_px <= 0.0 || physical <= 0.0 || image_px <= 0.0 {
        return None;
    }
    let target_px = physical * PIXELS_PER_CM;
    let scale_factor = target_px / render_px;
    Some(image_px * scale_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawCatalogItem {
        RawCatalogItem {
            catalog_item_id: id.to_string(),
            display_name: "Star Charm".to_string(),
            unit_price: 4.5,
            image_reference: Some("https://cdn.example/star.png".to_string()),
            image_base64: None,
            physical_width_cm: None,
            render_pixel_width: None,
            render_image_width_px: None,
        }
    }

    #[test]
    fn test_default_width_without_sizing_metadata() {
        let item = ItemDescriptor::normalize(raw("star")).unwrap();
        assert!((item.display_width - DEFAULT_ITEM_WIDTH).abs() < f64::EPSILON);
        assert_eq!(item.image, ImageRef::Url("https://cdn.example/star.png".to_string()));
    }

    #[test]
    fn test_physical_sizing_math() {
        // 5cm at 45 px/cm targets 225px; source rendered at 200px scales by
        // 1.125, applied to a 400px image -> 450.
        let mut r = raw("moon");
        r.physical_width_cm = Some(5.0);
        r.render_pixel_width = Some(200.0);
        r.render_image_width_px = Some(400.0);
        let item = ItemDescriptor::normalize(r).unwrap();
        assert!((item.display_width - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_sizing_metadata_falls_back() {
        let mut r = raw("moon");
        r.physical_width_cm = Some(5.0);
        let item = ItemDescriptor::normalize(r).unwrap();
        assert!((item.display_width - DEFAULT_ITEM_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let mut r = raw("ghost");
        r.image_reference = None;
        let err = ItemDescriptor::normalize(r).unwrap_err();
        assert!(matches!(err, CatalogError::MissingImage(id) if id == "ghost"));
    }

    #[test]
    fn test_inline_payload_wins_over_url() {
        let mut r = raw("heart");
        r.image_base64 = Some("aGVsbG8=".to_string());
        let item = ItemDescriptor::normalize(r).unwrap();
        assert_eq!(item.image.inline_bytes().unwrap(), b"hello");
    }

    #[test]
    fn test_alternate_image_keys() {
        let item: RawCatalogItem = serde_json::from_str(
            r#"{"catalogItemId":"a","displayName":"A","unitPrice":1.0,"imageUrl":"x.png"}"#,
        )
        .unwrap();
        assert_eq!(item.image_reference.as_deref(), Some("x.png"));

        let item: RawCatalogItem = serde_json::from_str(
            r#"{"catalogItemId":"b","displayName":"B","unitPrice":1.0,"image":"y.png"}"#,
        )
        .unwrap();
        assert_eq!(item.image_reference.as_deref(), Some("y.png"));
    }
}
