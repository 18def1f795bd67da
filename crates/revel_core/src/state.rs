//! Widget state machines
//!
//! Widgets define an interaction-state enum and map events to transitions
//! with pure functions. The trait returns `Option<Self>` so "no transition"
//! is distinguishable from a self-transition.
//!
//! # Example
//!
//! ```rust
//! use revel_core::{event_types::*, StateTransitions};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
//! enum HoverState {
//!     #[default]
//!     Idle,
//!     Hovered,
//! }
//!
//! impl StateTransitions for HoverState {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (HoverState::Idle, POINTER_ENTER) => Some(HoverState::Hovered),
//!             (HoverState::Hovered, POINTER_LEAVE) => Some(HoverState::Idle),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut s = HoverState::Idle;
//! if let Some(next) = s.on_event(POINTER_ENTER) {
//!     s = next;
//! }
//! assert_eq!(s, HoverState::Hovered);
//! ```

use std::hash::Hash;

/// Trait for user-defined widget state machines
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply an event in place, returning true if the state changed
    fn apply(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    enum PressState {
        #[default]
        Idle,
        Pressed,
    }

    impl StateTransitions for PressState {
        fn on_event(&self, event: u32) -> Option<Self> {
            match (self, event) {
                (PressState::Idle, POINTER_DOWN) => Some(PressState::Pressed),
                (PressState::Pressed, POINTER_UP) => Some(PressState::Idle),
                _ => None,
            }
        }
    }

    #[test]
    fn test_apply_transitions() {
        let mut s = PressState::Idle;
        assert!(s.apply(POINTER_DOWN));
        assert_eq!(s, PressState::Pressed);
        // Repeated press event is not a transition
        assert!(!s.apply(POINTER_DOWN));
        assert!(s.apply(POINTER_UP));
        assert_eq!(s, PressState::Idle);
    }

}
