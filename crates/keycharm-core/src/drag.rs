//! Drag state machine turning pointer events into placement updates.

use crate::geometry::Viewport;
use crate::placement::{InstanceId, PlacementState};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Whether dragged items may leave the visible canvas region.
///
/// Freeform keeps the observed unconstrained behavior; Clamped keeps the
/// item center inside the logical canvas rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementPolicy {
    #[default]
    Freeform,
    Clamped,
}

/// Drag gesture state. A single variable, so at most one drag can exist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: InstanceId,
        /// `pointer_logical - item.position`, captured once at drag start
        /// so the item does not jump under the pointer.
        offset: Vec2,
    },
}

/// Converts pointer-down/move/up/leave into position writes on the one
/// actively-dragged placement.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    policy: PlacementPolicy,
}

impl DragController {
    /// Create an idle controller with the freeform policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle controller with an explicit placement policy.
    pub fn with_policy(policy: PlacementPolicy) -> Self {
        Self {
            state: DragState::Idle,
            policy,
        }
    }

    /// The actively-dragged placement, if any.
    pub fn dragged_id(&self) -> Option<InstanceId> {
        match self.state {
            DragState::Dragging { id, .. } => Some(id),
            DragState::Idle => None,
        }
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Placement policy in effect.
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Pointer-down on the surface.
    ///
    /// Hits select the item and begin a drag (superseding any prior one);
    /// misses clear the selection. Returns the hit placement, if any.
    /// With unmeasured geometry nothing happens.
    pub fn on_pointer_down(
        &mut self,
        placement: &mut PlacementState,
        viewport: &Viewport,
        screen: Point,
    ) -> Option<InstanceId> {
        let logical = viewport.screen_to_logical(screen)?;
        match placement.hit_test(logical, self.dragged_id()) {
            Some(id) => {
                if let DragState::Dragging { id: prior, .. } = self.state {
                    log::debug!("drag of {prior} superseded by {id}");
                }
                placement.select(Some(id));
                // Position is always present for a hit id.
                let position = placement.get(id).map(|item| item.position)?;
                self.state = DragState::Dragging {
                    id,
                    offset: logical - position,
                };
                Some(id)
            }
            None => {
                placement.select(None);
                self.state = DragState::Idle;
                None
            }
        }
    }

    /// Pointer-move: last-write-wins position update for the dragged item.
    /// A no-op while idle or while the surface geometry is unmeasurable.
    pub fn on_pointer_move(
        &mut self,
        placement: &mut PlacementState,
        viewport: &Viewport,
        screen: Point,
    ) {
        let DragState::Dragging { id, offset } = self.state else {
            return;
        };
        let Some(logical) = viewport.screen_to_logical(screen) else {
            return;
        };
        let mut position = logical - offset;
        if self.policy == PlacementPolicy::Clamped {
            let canvas = viewport.logical_rect();
            position.x = position.x.clamp(canvas.x0, canvas.x1);
            position.y = position.y.clamp(canvas.y0, canvas.y1);
        }
        placement.set_position(id, position);
    }

    /// Pointer-up: the drag ends, the last written position stands.
    pub fn on_pointer_up(&mut self) {
        if let DragState::Dragging { id, .. } = self.state {
            log::debug!("drag of {id} released");
        }
        self.state = DragState::Idle;
    }

    /// Pointer left the tracked surface: ends the drag exactly like a
    /// release, so a button-up outside the surface cannot strand it.
    pub fn on_pointer_leave(&mut self) {
        self.on_pointer_up();
    }
}
