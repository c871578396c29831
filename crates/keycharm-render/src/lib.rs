//! Snapshot raster pipeline for the KeyCharm composer.
//!
//! Decodes item graphics, composites the composition into an RGBA raster
//! and encodes the deterministic PNG snapshot used for cart thumbnails
//! and sharing.

pub mod compositor;
pub mod exporter;
pub mod graphics;
pub mod share;

pub use exporter::{SnapshotError, SnapshotExporter, SnapshotOptions};
pub use graphics::GraphicStore;
