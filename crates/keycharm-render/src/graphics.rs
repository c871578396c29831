//! Item graphic store.
//!
//! Raw image payloads are registered per catalog item and decoded to RGBA
//! before any capture samples them; sampling an undecoded graphic would
//! silently produce blank regions in the snapshot.

use image::RgbaImage;
use keycharm_core::catalog::{ImageRef, ItemDescriptor};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Slot {
    /// Raw bytes waiting for decode.
    Pending(Vec<u8>),
    /// Decoded pixels, ready to sample.
    Ready(RgbaImage),
}

/// Decoded-image cache keyed by catalog item id.
///
/// Inline payloads decode locally; URL-referenced graphics are fetched by
/// a collaborator, which hands the bytes over via [`GraphicStore::insert_bytes`].
#[derive(Debug, Clone, Default)]
pub struct GraphicStore {
    slots: HashMap<String, Slot>,
}

impl GraphicStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor's graphic. Inline payloads are staged for
    /// decode; URL references wait for the collaborator's bytes.
    pub fn register(&mut self, item: &ItemDescriptor) {
        match &item.image {
            ImageRef::Inline(_) => {
                if let Some(bytes) = item.image.inline_bytes() {
                    self.insert_bytes(&item.catalog_item_id, bytes);
                } else {
                    log::warn!("item {} carries an undecodable inline payload", item.catalog_item_id);
                }
            }
            ImageRef::Url(url) => {
                if !self.slots.contains_key(&item.catalog_item_id) {
                    log::debug!("item {} graphic at {url} awaits fetched bytes", item.catalog_item_id);
                }
            }
        }
    }

    /// Stage raw image bytes (PNG/JPEG/WebP) for a catalog item.
    pub fn insert_bytes(&mut self, catalog_item_id: &str, bytes: Vec<u8>) {
        self.slots
            .insert(catalog_item_id.to_string(), Slot::Pending(bytes));
    }

    /// Insert an already-decoded image.
    pub fn insert_image(&mut self, catalog_item_id: &str, image: RgbaImage) {
        self.slots
            .insert(catalog_item_id.to_string(), Slot::Ready(image));
    }

    /// Decode every staged payload. Capture must not start until this has
    /// completed for all referenced items.
    pub fn decode_all(&mut self) -> Result<(), image::ImageError> {
        for (id, slot) in self.slots.iter_mut() {
            if let Slot::Pending(bytes) = slot {
                let decoded = image::load_from_memory(bytes)?.to_rgba8();
                log::debug!("decoded graphic for {id}: {}x{}", decoded.width(), decoded.height());
                *slot = Slot::Ready(decoded);
            }
        }
        Ok(())
    }

    /// Decoded pixels for a catalog item, if ready.
    pub fn get(&self, catalog_item_id: &str) -> Option<&RgbaImage> {
        match self.slots.get(catalog_item_id) {
            Some(Slot::Ready(image)) => Some(image),
            _ => None,
        }
    }

    /// Whether a catalog item's graphic is decoded.
    pub fn is_ready(&self, catalog_item_id: &str) -> bool {
        matches!(self.slots.get(catalog_item_id), Some(Slot::Ready(_)))
    }

    /// Whether every listed catalog item has a decoded graphic.
    pub fn all_ready<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        ids.into_iter().all(|id| self.is_ready(id))
    }
}
