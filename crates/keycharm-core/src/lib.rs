//! KeyCharm Core Library
//!
//! Platform-agnostic composition engine for the KeyCharm keyring builder.

pub mod builder;
pub mod catalog;
pub mod drag;
pub mod geometry;
pub mod input;
pub mod placement;
pub mod resize;

pub use builder::{Composer, CompositionRecord, PlacedItemRecord};
pub use catalog::{CatalogError, ImageRef, ItemDescriptor, RawCatalogItem, DEFAULT_ITEM_WIDTH};
pub use drag::{DragController, DragState, PlacementPolicy};
pub use geometry::{Viewport, DEFAULT_HEIGHT, LOGICAL_WIDTH, MAX_HEIGHT, MIN_HEIGHT, PIXELS_PER_CM};
pub use input::PointerEvent;
pub use placement::{InstanceId, PlacedItem, PlacementState};
pub use resize::CanvasSizeController;
