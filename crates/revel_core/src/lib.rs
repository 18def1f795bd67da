//! Revel Core
//!
//! Foundational primitives for the Revel reveal-orchestration workspace:
//!
//! - **Geometry**: points, sizes, rects, element edges
//! - **Events**: pointer/scroll/resize event types shared by every crate
//! - **Target Registry**: opaque target handles resolved to mutable style
//!   sinks at bind time; the render layer owns the nodes, the orchestrator
//!   only references them
//! - **State Machines**: the `StateTransitions` trait widgets implement for
//!   their interaction states
//! - **Errors**: the configuration/runtime error taxonomy
//!
//! # Example
//!
//! ```rust
//! use revel_core::{Rect, TargetRegistry};
//!
//! let mut registry = TargetRegistry::new();
//! let hero = registry.register("hero", Rect::new(0.0, 0.0, 1280.0, 720.0));
//!
//! // Style sinks start at rest: content is fully visible with no
//! // animation attached.
//! assert_eq!(registry.style(hero).unwrap().opacity, 1.0);
//! ```

pub mod error;
pub mod events;
pub mod geometry;
pub mod state;
pub mod target;

pub use error::Error;
pub use events::{event_types, PointerButton, PointerEvent};
pub use geometry::{Edge, Point, Rect, Size};
pub use state::StateTransitions;
pub use target::{StyleProperty, StyleSink, TargetId, TargetRegistry};
