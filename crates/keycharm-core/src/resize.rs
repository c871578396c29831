//! Canvas height resize controller.
//!
//! The canvas keeps a fixed logical width; its height is adjusted with a
//! drag handle and clamped to `[MIN_HEIGHT, MAX_HEIGHT]`.

use crate::geometry::{DEFAULT_HEIGHT, MAX_HEIGHT, MIN_HEIGHT};

/// Resize gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum ResizeState {
    #[default]
    Resting,
    Resizing {
        start_pointer_y: f64,
        start_height: f64,
    },
}

/// Owns the mutable logical canvas height and the resize gesture.
///
/// While a resize is active, height-change transitions are suppressed so
/// the surface tracks the pointer without animation lag.
#[derive(Debug, Clone)]
pub struct CanvasSizeController {
    state: ResizeState,
    height: f64,
}

impl Default for CanvasSizeController {
    fn default() -> Self {
        Self {
            state: ResizeState::Resting,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl CanvasSizeController {
    /// Create a controller at the default height.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical canvas height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set the height directly (clamped). Used when restoring a composition.
    pub fn set_height(&mut self, height: f64) {
        self.height = height.clamp(MIN_HEIGHT, MAX_HEIGHT);
    }

    /// Whether a resize gesture is in progress.
    pub fn is_resizing(&self) -> bool {
        !matches!(self.state, ResizeState::Resting)
    }

    /// Whether height-change transitions should be suppressed right now.
    pub fn transitions_suppressed(&self) -> bool {
        self.is_resizing()
    }

    /// Begin a resize gesture at the given pointer y (screen space; only
    /// deltas matter). Supersedes any gesture already in progress.
    pub fn begin(&mut self, pointer_y: f64) {
        self.state = ResizeState::Resizing {
            start_pointer_y: pointer_y,
            start_height: self.height,
        };
    }

    /// Continuous height write while resizing:
    /// `clamp(start_height + (pointer_y - start_pointer_y))`.
    /// A no-op while resting.
    pub fn update(&mut self, pointer_y: f64) {
        let ResizeState::Resizing {
            start_pointer_y,
            start_height,
        } = self.state
        else {
            return;
        };
        self.height = (start_height + (pointer_y - start_pointer_y)).clamp(MIN_HEIGHT, MAX_HEIGHT);
    }

    /// End the gesture; the last written height stands and transitions
    /// re-enable.
    pub fn finish(&mut self) {
        if self.is_resizing() {
            log::debug!("canvas height committed at {}", self.height);
        }
        self.state = ResizeState::Resting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_height() {
        let sizer = CanvasSizeController::new();
        assert!((sizer.height() - DEFAULT_HEIGHT).abs() < f64::EPSILON);
        assert!(!sizer.is_resizing());
    }

    #[test]
    fn test_resize_delta_applies_from_start_capture() {
        let mut sizer = CanvasSizeController::new();
        sizer.begin(100.0);
        assert!(sizer.transitions_suppressed());

        sizer.update(160.0);
        assert!((sizer.height() - (DEFAULT_HEIGHT + 60.0)).abs() < 1e-9);

        // Delta is against the captured start, not the previous update.
        sizer.update(130.0);
        assert!((sizer.height() - (DEFAULT_HEIGHT + 30.0)).abs() < 1e-9);

        sizer.finish();
        assert!(!sizer.transitions_suppressed());
        assert!((sizer.height() - (DEFAULT_HEIGHT + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut sizer = CanvasSizeController::new();
        sizer.begin(0.0);
        sizer.update(-5000.0);
        assert!((sizer.height() - MIN_HEIGHT).abs() < f64::EPSILON);
        sizer.update(5000.0);
        assert!((sizer.height() - MAX_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overshoot_scenario() {
        // Starting height 650, drag delta +500 -> min(1500, 1150) = 1150.
        let mut sizer = CanvasSizeController::new();
        sizer.set_height(650.0);
        sizer.begin(200.0);
        sizer.update(700.0);
        assert!((sizer.height() - 1150.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_while_resting_is_noop() {
        let mut sizer = CanvasSizeController::new();
        sizer.update(400.0);
        assert!((sizer.height() - DEFAULT_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_height_clamps() {
        let mut sizer = CanvasSizeController::new();
        sizer.set_height(50.0);
        assert!((sizer.height() - MIN_HEIGHT).abs() < f64::EPSILON);
        sizer.set_height(9999.0);
        assert!((sizer.height() - MAX_HEIGHT).abs() < f64::EPSILON);
    }
}
