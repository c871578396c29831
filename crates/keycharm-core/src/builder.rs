//! The composer: single owner of all mutable composition state.
//!
//! Every mutator entry point goes through [`Composer`]; collaborators get
//! the composition only as a full read ([`Composer::placement`] /
//! [`Composer::composition_record`]) or a full replace
//! ([`Composer::replace_items`]).

use crate::catalog::{CatalogError, ItemDescriptor, RawCatalogItem};
use crate::drag::{DragController, PlacementPolicy};
use crate::geometry::Viewport;
use crate::input::PointerEvent;
use crate::placement::{InstanceId, PlacedItem, PlacementState};
use crate::resize::CanvasSizeController;
use base64::{engine::general_purpose::STANDARD, Engine};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// One placement in the exported composition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItemRecord {
    pub instance_id: InstanceId,
    pub catalog_item_id: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

/// The exported composition summary handed to the cart/share collaborators.
///
/// The snapshot travels base64-encoded for JSON friendliness, like every
/// other inline image payload in this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRecord {
    pub placed_items: Vec<PlacedItemRecord>,
    pub logical_canvas_height: f64,
    pub total_price: f64,
    /// PNG snapshot, base64-encoded; `None` when capture was unavailable.
    pub snapshot_image: Option<String>,
}

impl CompositionRecord {
    /// Decode the snapshot back to PNG bytes.
    pub fn snapshot_bytes(&self) -> Option<Vec<u8>> {
        self.snapshot_image
            .as_deref()
            .and_then(|data| STANDARD.decode(data).ok())
    }
}

/// Runtime builder state: placement, viewport and the two gesture
/// controllers, owned together so their invariants cannot be split up.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    placement: PlacementState,
    viewport: Viewport,
    drag: DragController,
    sizer: CanvasSizeController,
}

impl Composer {
    /// Create an empty composer with default geometry and freeform placement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer with an explicit placement policy.
    pub fn with_policy(policy: PlacementPolicy) -> Self {
        Self {
            drag: DragController::with_policy(policy),
            ..Self::default()
        }
    }

    // --- catalog ingestion ---------------------------------------------

    /// Normalize and place a raw catalog descriptor.
    pub fn ingest(&mut self, raw: RawCatalogItem) -> Result<InstanceId, CatalogError> {
        let descriptor = ItemDescriptor::normalize(raw)?;
        Ok(self.add_item(descriptor))
    }

    /// Place a normalized descriptor near the canvas center.
    pub fn add_item(&mut self, descriptor: ItemDescriptor) -> InstanceId {
        self.placement.add(descriptor, self.sizer.height())
    }

    // --- interaction ----------------------------------------------------

    /// Record the observed display rectangle of the composition surface.
    pub fn set_display_rect(&mut self, rect: Rect) {
        self.viewport.set_display_rect(rect);
    }

    /// Feed a pointer event from the composition surface.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => {
                self.drag
                    .on_pointer_down(&mut self.placement, &self.viewport, position);
            }
            PointerEvent::Move { position } => {
                self.drag
                    .on_pointer_move(&mut self.placement, &self.viewport, position);
            }
            PointerEvent::Up { .. } => self.drag.on_pointer_up(),
            PointerEvent::Leave => self.drag.on_pointer_leave(),
        }
    }

    /// Begin the resize-handle gesture.
    pub fn resize_begin(&mut self, pointer_y: f64) {
        self.sizer.begin(pointer_y);
    }

    /// Continuous resize update; keeps the viewport's logical height in sync.
    pub fn resize_update(&mut self, pointer_y: f64) {
        self.sizer.update(pointer_y);
        self.viewport.set_logical_height(self.sizer.height());
    }

    /// End the resize gesture.
    pub fn resize_end(&mut self) {
        self.sizer.finish();
    }

    // --- placement mutators ---------------------------------------------

    /// Remove a placement.
    pub fn remove_item(&mut self, id: InstanceId) -> Option<PlacedItem> {
        if self.drag.dragged_id() == Some(id) {
            self.drag.on_pointer_up();
        }
        self.placement.remove(id)
    }

    /// Remove everything (the full-clear action).
    pub fn clear(&mut self) {
        self.drag.on_pointer_up();
        self.placement.clear();
    }

    /// Select a placement directly (e.g. from an item list UI).
    pub fn select(&mut self, id: Option<InstanceId>) {
        self.placement.select(id);
    }

    /// Rotate the selected placement by a delta in degrees.
    pub fn rotate_selected(&mut self, delta_degrees: f64) {
        if let Some(id) = self.placement.selected() {
            self.placement.rotate(id, delta_degrees);
        }
    }

    /// Set a placement's rotation in degrees (normalized).
    pub fn set_rotation(&mut self, id: InstanceId, degrees: f64) {
        self.placement.set_rotation(id, degrees);
    }

    /// Swap a placement with its next-higher paint-order neighbor.
    pub fn bring_forward(&mut self, id: InstanceId) -> bool {
        self.placement.bring_forward(id)
    }

    /// Swap a placement with its next-lower paint-order neighbor.
    pub fn send_backward(&mut self, id: InstanceId) -> bool {
        self.placement.send_backward(id)
    }

    /// Replace the whole composition (collaborator interface).
    pub fn replace_items(&mut self, items: Vec<PlacedItem>) {
        self.drag.on_pointer_up();
        self.placement.replace(items);
    }

    // --- reads ----------------------------------------------------------

    /// The composition state (read-only).
    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    /// The viewport (read-only).
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current logical canvas height.
    pub fn canvas_height(&self) -> f64 {
        self.sizer.height()
    }

    /// Restore a canvas height (clamped), e.g. from a saved composition.
    pub fn set_canvas_height(&mut self, height: f64) {
        self.sizer.set_height(height);
        self.viewport.set_logical_height(self.sizer.height());
    }

    /// Currently selected placement.
    pub fn selected(&self) -> Option<InstanceId> {
        self.placement.selected()
    }

    /// The actively dragged placement.
    pub fn dragged(&self) -> Option<InstanceId> {
        self.drag.dragged_id()
    }

    /// Whether height-change transitions should be suppressed.
    pub fn transitions_suppressed(&self) -> bool {
        self.sizer.transitions_suppressed()
    }

    /// Transient rendering order (dragged topmost, selection just below).
    pub fn render_order(&self) -> Vec<InstanceId> {
        self.placement.render_order(self.drag.dragged_id())
    }

    /// Build the composition record for the cart/share collaborators.
    /// `snapshot_png` is the exporter's output, if a capture succeeded.
    pub fn composition_record(&self, snapshot_png: Option<&[u8]>) -> CompositionRecord {
        CompositionRecord {
            placed_items: self
                .placement
                .items()
                .iter()
                .map(|item| PlacedItemRecord {
                    instance_id: item.instance_id,
                    catalog_item_id: item.item.catalog_item_id.clone(),
                    x: item.position.x,
                    y: item.position.y,
                    rotation: item.rotation_degrees,
                })
                .collect(),
            logical_canvas_height: self.sizer.height(),
            total_price: self.placement.total_price(),
            snapshot_image: snapshot_png.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}
