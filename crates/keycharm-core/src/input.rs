//! Pointer events driving the composition surface.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Unified mouse/touch pointer event, in screen coordinates.
///
/// `Leave` fires when the pointer exits the tracked surface; a drag must
/// end on it as well, otherwise releasing the button outside the surface
/// leaves the gesture stuck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    Leave,
}
