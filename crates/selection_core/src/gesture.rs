//! Horizontal swipe interpretation.
//!
//! The recognizer only turns a drag into a discrete [`SwipeDecision`]; the
//! drag offset it tracks while moving is for visual feedback and never
//! touches the model.

use crate::model::Decision;

/// Horizontal distance a drag must strictly exceed to count as a decision.
pub const SWIPE_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    Like,
    Dislike,
    None,
}

impl SwipeDecision {
    pub fn from_delta(delta: f64, threshold: f64) -> Self {
        if delta > threshold {
            SwipeDecision::Like
        } else if delta < -threshold {
            SwipeDecision::Dislike
        } else {
            SwipeDecision::None
        }
    }

    pub fn as_decision(self) -> Option<Decision> {
        match self {
            SwipeDecision::Like => Some(Decision::Liked),
            SwipeDecision::Dislike => Some(Decision::Disliked),
            SwipeDecision::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub phase: GesturePhase,
    pub start_x: f64,
    pub current_x: f64,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    state: GestureState,
    threshold: f64,
    enabled: bool,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::with_threshold(SWIPE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            state: GestureState::default(),
            threshold,
            enabled: true,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning the recognizer off also abandons any drag in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Signed offset of the current drag; zero when idle.
    pub fn drag_offset(&self) -> f64 {
        match self.state.phase {
            GesturePhase::Dragging => self.state.current_x - self.state.start_x,
            GesturePhase::Idle => 0.0,
        }
    }

    /// Decision the drag would produce if released now.
    pub fn preview(&self) -> SwipeDecision {
        SwipeDecision::from_delta(self.drag_offset(), self.threshold)
    }

    pub fn on_drag_start(&mut self, x: f64) {
        if !self.enabled {
            return;
        }
        // The drag has not moved yet, so its offset starts at zero.
        self.state = GestureState {
            phase: GesturePhase::Dragging,
            start_x: x,
            current_x: x,
        };
    }

    pub fn on_drag_move(&mut self, x: f64) {
        if self.enabled && self.state.phase == GesturePhase::Dragging {
            self.state.current_x = x;
        }
    }

    /// Ends the drag cycle. State is cleared whatever the outcome.
    pub fn on_drag_end(&mut self) -> SwipeDecision {
        let decision = if self.enabled && self.state.phase == GesturePhase::Dragging {
            self.preview()
        } else {
            SwipeDecision::None
        };
        self.reset();
        decision
    }

    fn reset(&mut self) {
        self.state = GestureState::default();
    }
}
