//! Revel Animation System
//!
//! Seekable timelines, easing curves, spring physics, and the frame
//! scheduler that ticks them.
//!
//! # Features
//!
//! - **Timelines**: ordered property segments with relative position
//!   offsets, scrubbed to any progress fraction or played on the clock
//! - **Easing**: monotonic curves plus intentionally overshooting
//!   back/elastic variants
//! - **Springs**: RK4-integrated physics used for scroller edge bounce
//! - **Scheduler**: single-threaded frame ticking with weak handles and
//!   recurring tick callbacks (autoplay timers, typewriters)

pub mod easing;
pub mod scheduler;
pub mod spring;
pub mod timeline;

pub use easing::Easing;
pub use scheduler::{Scheduler, SchedulerHandle, TickCallback, TickerId, TimelineKey};
pub use spring::{Spring, SpringParams};
pub use timeline::{Position, Segment, StyleState, Timeline, Tween};
