//! Placement state: the ordered list of charms on the canvas.
//!
//! The list index is the committed z-order (back to front). Order indices
//! stay unique and contiguous by construction; every reorder is a swap and
//! every removal compacts the vector.

use crate::catalog::ItemDescriptor;
use crate::geometry::LOGICAL_WIDTH;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique id of one placement (distinct from the catalog item id; the same
/// catalog item can be placed many times).
pub type InstanceId = Uuid;

/// How far (logical units) a freshly added item may land from canvas center.
const JITTER_RADIUS: f64 = 24.0;

/// Deterministic per-process jitter sequence (splitmix32-style mix over a
/// counter, works the same on every platform).
fn jitter_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut x = counter.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// Jittered drop position near the canvas center, so stacked adds do not
/// land exactly on top of each other.
fn jittered_center(canvas_height: f64) -> Point {
    let seed = jitter_seed();
    let jx = ((seed & 0xFFFF) as f64 / 65535.0 - 0.5) * 2.0 * JITTER_RADIUS;
    let jy = ((seed >> 16) as f64 / 65535.0 - 0.5) * 2.0 * JITTER_RADIUS;
    Point::new(LOGICAL_WIDTH / 2.0 + jx, canvas_height / 2.0 + jy)
}

/// Normalize an angle in degrees into `(-180, 180]`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// One charm placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub instance_id: InstanceId,
    /// Normalized catalog descriptor this placement refers to.
    pub item: ItemDescriptor,
    /// Center position in logical canvas units.
    pub position: Point,
    /// Rotation in degrees, normalized into (-180, 180].
    pub rotation_degrees: f64,
}

impl PlacedItem {
    fn new(item: ItemDescriptor, position: Point) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            item,
            position,
            rotation_degrees: 0.0,
        }
    }

    /// Hit-test bounds in logical units.
    ///
    /// The charm is approximated as a square of its display width centered
    /// on its position; the graphic's aspect is a render-side concern.
    pub fn bounds(&self) -> Rect {
        let half = self.item.display_width / 2.0;
        Rect::new(
            self.position.x - half,
            self.position.y - half,
            self.position.x + half,
            self.position.y + half,
        )
    }

    /// Check whether a logical-space point falls on this item.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

/// The single source of truth for the composition.
///
/// Owned exclusively by the composer; collaborators only see full reads
/// (`items`) or full replaces (`replace`), never per-field mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementState {
    items: Vec<PlacedItem>,
    /// At most one selected placement.
    selected: Option<InstanceId>,
}

impl PlacementState {
    /// Create an empty placement state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new placement near the canvas center (jittered), rotation 0.
    /// Returns the new instance id; the item becomes the top layer.
    pub fn add(&mut self, item: ItemDescriptor, canvas_height: f64) -> InstanceId {
        let placed = PlacedItem::new(item, jittered_center(canvas_height));
        let id = placed.instance_id;
        log::debug!("placed {} ({}) at {:?}", id, placed.item.display_name, placed.position);
        self.items.push(placed);
        id
    }

    /// Remove a placement. Clears the selection if it pointed at it.
    pub fn remove(&mut self, id: InstanceId) -> Option<PlacedItem> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.items.remove(index))
    }

    /// Remove everything and drop the selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    /// Committed items, back to front.
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Replace the whole composition (full-replace collaborator interface).
    /// A selection pointing at a vanished item is dropped.
    pub fn replace(&mut self, items: Vec<PlacedItem>) {
        self.items = items;
        if let Some(id) = self.selected {
            if self.index_of(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the canvas is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a placement by id.
    pub fn get(&self, id: InstanceId) -> Option<&PlacedItem> {
        self.index_of(id).map(|i| &self.items[i])
    }

    /// Committed z-order index of a placement.
    pub fn index_of(&self, id: InstanceId) -> Option<usize> {
        self.items.iter().position(|item| item.instance_id == id)
    }

    /// Move a placement's position (drag controller entry point).
    pub fn set_position(&mut self, id: InstanceId, position: Point) {
        if let Some(index) = self.index_of(id) {
            self.items[index].position = position;
        }
    }

    /// Set a placement's rotation, normalized into (-180, 180].
    pub fn set_rotation(&mut self, id: InstanceId, degrees: f64) {
        if let Some(index) = self.index_of(id) {
            self.items[index].rotation_degrees = normalize_degrees(degrees);
        }
    }

    /// Rotate a placement by a delta in degrees.
    pub fn rotate(&mut self, id: InstanceId, delta_degrees: f64) {
        if let Some(index) = self.index_of(id) {
            let current = self.items[index].rotation_degrees;
            self.items[index].rotation_degrees = normalize_degrees(current + delta_degrees);
        }
    }

    /// Select a placement (or clear with `None`). Unknown ids clear too.
    pub fn select(&mut self, id: Option<InstanceId>) {
        self.selected = id.filter(|&id| self.index_of(id).is_some());
    }

    /// Currently selected placement, if any.
    pub fn selected(&self) -> Option<InstanceId> {
        self.selected
    }

    /// Swap the item with its next-higher neighbor in paint order.
    /// Returns false (no-op) when already frontmost.
    pub fn bring_forward(&mut self, id: InstanceId) -> bool {
        if let Some(pos) = self.index_of(id) {
            if pos < self.items.len() - 1 {
                self.items.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    /// Swap the item with its next-lower neighbor in paint order.
    /// Returns false (no-op) when already backmost.
    pub fn send_backward(&mut self, id: InstanceId) -> bool {
        if let Some(pos) = self.index_of(id) {
            if pos > 0 {
                self.items.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    /// Committed paint order (back to front).
    pub fn paint_order(&self) -> Vec<InstanceId> {
        self.items.iter().map(|item| item.instance_id).collect()
    }

    /// Transient rendering order: the dragged item is topmost, the
    /// selected-but-not-dragged item sits just below it, everything else
    /// keeps committed order. The committed order itself is untouched.
    pub fn render_order(&self, dragging: Option<InstanceId>) -> Vec<InstanceId> {
        let promoted_selection = self.selected.filter(|&id| Some(id) != dragging);
        let mut order: Vec<InstanceId> = self
            .items
            .iter()
            .map(|item| item.instance_id)
            .filter(|&id| Some(id) != dragging && Some(id) != promoted_selection)
            .collect();
        if let Some(id) = promoted_selection {
            order.push(id);
        }
        if let Some(id) = dragging.filter(|&id| self.index_of(id).is_some()) {
            order.push(id);
        }
        order
    }

    /// Find the topmost item under a logical-space point, honoring the
    /// transient render order so the visually frontmost item wins.
    pub fn hit_test(&self, point: Point, dragging: Option<InstanceId>) -> Option<InstanceId> {
        self.render_order(dragging)
            .into_iter()
            .rev()
            .find(|&id| self.get(id).is_some_and(|item| item.hit_test(point)))
    }

    /// Sum of unit prices across all placements.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.item.unit_price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ImageRef, ItemDescriptor};
    use crate::geometry::DEFAULT_HEIGHT;

    fn descriptor(id: &str, price: f64) -> ItemDescriptor {
        ItemDescriptor {
            catalog_item_id: id.to_string(),
            display_name: id.to_string(),
            unit_price: price,
            image: ImageRef::Url(format!("{id}.png")),
            display_width: 100.0,
        }
    }

    fn state_with(ids: &[&str]) -> (PlacementState, Vec<InstanceId>) {
        let mut state = PlacementState::new();
        let ids = ids
            .iter()
            .map(|id| state.add(descriptor(id, 2.0), DEFAULT_HEIGHT))
            .collect();
        (state, ids)
    }

    #[test]
    fn test_add_lands_near_center_with_zero_rotation() {
        let (state, ids) = state_with(&["a"]);
        let item = state.get(ids[0]).unwrap();
        assert!((item.rotation_degrees).abs() < f64::EPSILON);
        assert!((item.position.x - LOGICAL_WIDTH / 2.0).abs() <= JITTER_RADIUS);
        assert!((item.position.y - DEFAULT_HEIGHT / 2.0).abs() <= JITTER_RADIUS);
    }

    #[test]
    fn test_insertion_order_is_z_order() {
        let (state, ids) = state_with(&["a", "b", "c"]);
        assert_eq!(state.paint_order(), ids);
    }

    #[test]
    fn test_reorder_and_remove_scenario() {
        // add A, B, C -> [A,B,C]; bring_forward(A) -> [B,A,C]; remove B ->
        // [A,C] with contiguous indices.
        let (mut state, ids) = state_with(&["a", "b", "c"]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        assert!(state.bring_forward(a));
        assert_eq!(state.paint_order(), vec![b, a, c]);

        state.remove(b);
        assert_eq!(state.paint_order(), vec![a, c]);
        assert_eq!(state.index_of(a), Some(0));
        assert_eq!(state.index_of(c), Some(1));
    }

    #[test]
    fn test_boundary_reorders_are_noops() {
        let (mut state, ids) = state_with(&["a", "b", "c"]);
        let order = state.paint_order();

        assert!(!state.send_backward(ids[0]));
        assert!(!state.bring_forward(ids[2]));
        assert_eq!(state.paint_order(), order);
    }

    #[test]
    fn test_remove_clears_selection() {
        let (mut state, ids) = state_with(&["a", "b"]);
        state.select(Some(ids[0]));
        state.remove(ids[0]);
        assert_eq!(state.selected(), None);
        state.select(Some(ids[1]));
        state.remove(ids[0]);
        assert_eq!(state.selected(), Some(ids[1]));
    }

    #[test]
    fn test_render_order_promotes_dragged_then_selected() {
        let (mut state, ids) = state_with(&["a", "b", "c"]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        state.select(Some(a));
        // b dragged: committed [a,b,c] renders as [c, a(selected), b(dragged)].
        assert_eq!(state.render_order(Some(b)), vec![c, a, b]);
        // Committed order never changed.
        assert_eq!(state.paint_order(), vec![a, b, c]);

        // Dragged item that is also the selection is only promoted once.
        state.select(Some(b));
        assert_eq!(state.render_order(Some(b)), vec![a, c, b]);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let (mut state, ids) = state_with(&["a", "b"]);
        // Both items at the same spot; b is on top by insertion order.
        state.set_position(ids[0], Point::new(200.0, 200.0));
        state.set_position(ids[1], Point::new(200.0, 200.0));
        assert_eq!(state.hit_test(Point::new(200.0, 200.0), None), Some(ids[1]));

        // Dragging a promotes it above b.
        assert_eq!(state.hit_test(Point::new(200.0, 200.0), Some(ids[0])), Some(ids[0]));

        // Outside both.
        assert_eq!(state.hit_test(Point::new(10.0, 10.0), None), None);
    }

    #[test]
    fn test_rotation_normalization() {
        let (mut state, ids) = state_with(&["a"]);
        state.set_rotation(ids[0], 270.0);
        assert!((state.get(ids[0]).unwrap().rotation_degrees + 90.0).abs() < 1e-9);

        state.set_rotation(ids[0], -180.0);
        assert!((state.get(ids[0]).unwrap().rotation_degrees - 180.0).abs() < 1e-9);

        state.rotate(ids[0], 45.0);
        assert!((state.get(ids[0]).unwrap().rotation_degrees + 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_replace_is_full_swap() {
        let (mut state, ids) = state_with(&["a", "b"]);
        state.select(Some(ids[1]));

        let kept: Vec<PlacedItem> = state.items().iter().take(1).cloned().collect();
        state.replace(kept);

        assert_eq!(state.len(), 1);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_total_price() {
        let mut state = PlacementState::new();
        state.add(descriptor("a", 2.5), DEFAULT_HEIGHT);
        state.add(descriptor("b", 4.0), DEFAULT_HEIGHT);
        assert!((state.total_price() - 6.5).abs() < 1e-9);
    }
}
