//! Revel Interaction Widgets
//!
//! The small local state machines a long-form page uses alongside the
//! scroll orchestrator. Each widget is independent of the render layer:
//! pure state plus pointer/tick inputs, with the host reading the state
//! back when painting.

pub mod accordion;
pub mod carousel;
pub mod compare;
pub mod marquee;
pub mod typewriter;

pub use accordion::Accordion;
pub use carousel::{Carousel, CarouselState};
pub use compare::CompareSlider;
pub use marquee::Marquee;
pub use typewriter::{Typewriter, TypewriterConfig};
