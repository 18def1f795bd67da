//! Scroller model with momentum and edge bounce
//!
//! Tracks one scrollable container: its offset, velocity, and a state
//! machine covering active scrolling, post-release deceleration, spring
//! bounce at the edges, and programmatic glides (anchor navigation).
//!
//! Offsets grow downward: 0 is the top, `max_offset` the bottom edge.
//!
//! ```text
//!                    SCROLL
//!     Idle ─────────────────────► Scrolling
//!       ▲                            │
//!       │                            │ SCROLL_END
//!       │ settled                    ▼
//!       ├───────────── Decelerating ─┘
//!       │                   │ hit edge
//!       ├───────────── Bouncing
//!       │ settled
//!       └───────────── Gliding  ◄── glide_to()
//! ```

use revel_animation::{Spring, SpringParams};
use revel_core::{event_types, Size, StateTransitions};

/// Internal events driving the scroll state machine
pub mod motion_events {
    /// Velocity or spring settled
    pub const SETTLED: u32 = 10001;
    /// Offset left the content bounds
    pub const HIT_EDGE: u32 = 10002;
    /// Programmatic glide started
    pub const GLIDE: u32 = 10003;
}

/// Scroll container states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollMotion {
    /// Content at rest
    #[default]
    Idle,
    /// Receiving user scroll input
    Scrolling,
    /// Momentum after release
    Decelerating,
    /// Overscroll spring pulling back to bounds
    Bouncing,
    /// Programmatic tween toward an anchor
    Gliding,
}

impl ScrollMotion {
    pub fn is_active(&self) -> bool {
        !matches!(self, ScrollMotion::Idle)
    }
}

impl StateTransitions for ScrollMotion {
    fn on_event(&self, event: u32) -> Option<Self> {
        use event_types::*;
        use motion_events::*;

        match (self, event) {
            (ScrollMotion::Idle, SCROLL) => Some(ScrollMotion::Scrolling),
            (ScrollMotion::Scrolling, SCROLL_END) => Some(ScrollMotion::Decelerating),
            (ScrollMotion::Scrolling, HIT_EDGE) => Some(ScrollMotion::Bouncing),
            (ScrollMotion::Decelerating, SETTLED) => Some(ScrollMotion::Idle),
            (ScrollMotion::Decelerating, HIT_EDGE) => Some(ScrollMotion::Bouncing),
            (ScrollMotion::Decelerating, SCROLL) => Some(ScrollMotion::Scrolling),
            (ScrollMotion::Bouncing, SETTLED) => Some(ScrollMotion::Idle),
            (ScrollMotion::Bouncing, SCROLL) => Some(ScrollMotion::Scrolling),
            // User input always cancels a glide
            (ScrollMotion::Gliding, SCROLL) => Some(ScrollMotion::Scrolling),
            (ScrollMotion::Gliding, SETTLED) => Some(ScrollMotion::Idle),
            (_, GLIDE) => Some(ScrollMotion::Gliding),
            _ => None,
        }
    }
}

/// Scroll behavior configuration
#[derive(Debug, Clone, Copy)]
pub struct ScrollConfig {
    /// Enable spring bounce past the edges
    pub bounce_enabled: bool,
    pub bounce_spring: SpringParams,
    /// Per-frame velocity retention during deceleration (0..1)
    pub friction: f32,
    /// Velocity below which deceleration settles (px/s)
    pub velocity_threshold: f32,
    /// Maximum overscroll as a fraction of viewport height
    pub max_overscroll: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            bounce_enabled: true,
            bounce_spring: SpringParams::bounce(),
            friction: 0.95,
            velocity_threshold: 0.5,
            max_overscroll: 0.3,
        }
    }
}

impl ScrollConfig {
    pub fn no_bounce() -> Self {
        Self {
            bounce_enabled: false,
            ..Default::default()
        }
    }
}

/// Retargetable eased tween used for anchor glides
#[derive(Clone, Copy, Debug)]
struct GlideTween {
    from: f32,
    to: f32,
    elapsed_ms: f32,
    duration_ms: f32,
}

impl GlideTween {
    fn new(from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(1.0),
        }
    }

    fn sample(&self) -> f32 {
        let t = (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        self.from + (self.to - self.from) * eased
    }

    fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// One scrollable container
pub struct Scroller {
    offset: f32,
    velocity: f32,
    motion: ScrollMotion,
    spring: Option<Spring>,
    glide: Option<GlideTween>,
    viewport: Size,
    content_height: f32,
    config: ScrollConfig,
}

impl Default for Scroller {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl Scroller {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            offset: 0.0,
            velocity: 0.0,
            motion: ScrollMotion::Idle,
            spring: None,
            glide: None,
            viewport: Size::default(),
            content_height: 0.0,
            config,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn motion(&self) -> ScrollMotion {
        self.motion
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Returns true if the viewport actually changed
    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// A scroller with no viewport yet cannot resolve trigger bounds
    pub fn is_sized(&self) -> bool {
        self.viewport.is_sized()
    }

    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport.height).max(0.0)
    }

    pub fn is_overscrolled(&self) -> bool {
        self.offset < 0.0 || self.offset > self.max_offset()
    }

    fn overscroll_target(&self) -> f32 {
        if self.offset < 0.0 {
            0.0
        } else {
            self.max_offset()
        }
    }

    /// Apply user scroll input; positive delta scrolls down
    pub fn apply_scroll_delta(&mut self, delta: f32) {
        self.motion.apply(event_types::SCROLL);
        self.glide = None;
        self.spring = None;

        if self.is_overscrolled() && self.config.bounce_enabled {
            // Rubber-band resistance past the edge
            self.offset += delta * 0.5;
        } else {
            self.offset += delta;
        }

        self.velocity = delta * 60.0;

        if self.config.bounce_enabled {
            let max_over = self.viewport.height * self.config.max_overscroll;
            self.offset = self.offset.clamp(-max_over, self.max_offset() + max_over);
        } else {
            self.offset = self.offset.clamp(0.0, self.max_offset());
        }
    }

    /// Scroll gesture released; start momentum or bounce
    pub fn end_gesture(&mut self) {
        if self.motion != ScrollMotion::Scrolling {
            return;
        }
        self.motion.apply(event_types::SCROLL_END);
        if self.is_overscrolled() && self.config.bounce_enabled {
            self.start_bounce();
        }
    }

    fn start_bounce(&mut self) {
        let mut spring = Spring::new(self.config.bounce_spring, self.offset);
        spring.set_target(self.overscroll_target());
        spring.set_velocity(self.velocity);
        self.spring = Some(spring);
        self.motion.apply(motion_events::HIT_EDGE);
    }

    /// Start an eased glide toward an absolute offset (anchor navigation)
    ///
    /// A glide already in flight is retargeted from its current position.
    pub fn glide_to(&mut self, target: f32, duration_ms: f32) {
        let target = target.clamp(0.0, self.max_offset());
        self.spring = None;
        self.velocity = 0.0;
        self.glide = Some(GlideTween::new(self.offset, target, duration_ms));
        self.motion.apply(motion_events::GLIDE);
    }

    /// Advance physics by `dt` seconds; returns true while still moving
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.motion {
            ScrollMotion::Idle => false,
            // Driven by input events, not ticks
            ScrollMotion::Scrolling => true,

            ScrollMotion::Decelerating => {
                self.velocity *= self.config.friction;
                self.offset += self.velocity * dt;

                if self.is_overscrolled() {
                    if self.config.bounce_enabled {
                        self.start_bounce();
                        return true;
                    }
                    self.offset = self.offset.clamp(0.0, self.max_offset());
                }

                if self.velocity.abs() < self.config.velocity_threshold {
                    self.velocity = 0.0;
                    self.motion.apply(motion_events::SETTLED);
                    return false;
                }
                true
            }

            ScrollMotion::Bouncing => {
                if let Some(ref mut spring) = self.spring {
                    spring.step(dt);
                    self.offset = spring.value();
                    if spring.is_settled() {
                        self.offset = spring.target();
                        self.spring = None;
                        self.motion.apply(motion_events::SETTLED);
                        return false;
                    }
                    true
                } else {
                    self.motion.apply(motion_events::SETTLED);
                    false
                }
            }

            ScrollMotion::Gliding => {
                if let Some(ref mut glide) = self.glide {
                    glide.elapsed_ms += dt * 1000.0;
                    self.offset = glide.sample();
                    if glide.is_done() {
                        self.offset = glide.to;
                        self.glide = None;
                        self.motion.apply(motion_events::SETTLED);
                        return false;
                    }
                    true
                } else {
                    self.motion.apply(motion_events::SETTLED);
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized_scroller() -> Scroller {
        let mut s = Scroller::default();
        s.set_viewport(Size::new(1280.0, 400.0));
        s.set_content_height(1000.0);
        s
    }

    #[test]
    fn test_basic_scroll() {
        let mut s = sized_scroller();
        assert_eq!(s.max_offset(), 600.0);

        s.apply_scroll_delta(50.0);
        assert_eq!(s.offset(), 50.0);
        assert_eq!(s.motion(), ScrollMotion::Scrolling);
    }

    #[test]
    fn test_overscroll_and_bounce_back() {
        let mut s = sized_scroller();
        s.apply_scroll_delta(-50.0);
        assert!(s.is_overscrolled());

        s.end_gesture();
        assert_eq!(s.motion(), ScrollMotion::Bouncing);

        for _ in 0..240 {
            if !s.tick(1.0 / 60.0) {
                break;
            }
        }
        assert_eq!(s.motion(), ScrollMotion::Idle);
        assert!(s.offset().abs() < 1.0);
    }

    #[test]
    fn test_no_bounce_clamps() {
        let mut s = Scroller::new(ScrollConfig::no_bounce());
        s.set_viewport(Size::new(1280.0, 400.0));
        s.set_content_height(1000.0);

        s.apply_scroll_delta(-100.0);
        assert_eq!(s.offset(), 0.0);

        s.apply_scroll_delta(10_000.0);
        assert_eq!(s.offset(), 600.0);
    }

    #[test]
    fn test_deceleration_settles() {
        let mut s = sized_scroller();
        s.apply_scroll_delta(20.0);
        s.end_gesture();
        assert_eq!(s.motion(), ScrollMotion::Decelerating);

        for _ in 0..600 {
            if !s.tick(1.0 / 60.0) {
                break;
            }
        }
        assert_eq!(s.motion(), ScrollMotion::Idle);
        assert!(s.offset() > 20.0);
        assert!(s.offset() <= s.max_offset());
    }

    #[test]
    fn test_glide_reaches_target() {
        let mut s = sized_scroller();
        s.glide_to(500.0, 240.0);
        assert_eq!(s.motion(), ScrollMotion::Gliding);

        for _ in 0..60 {
            if !s.tick(1.0 / 60.0) {
                break;
            }
        }
        assert_eq!(s.offset(), 500.0);
        assert_eq!(s.motion(), ScrollMotion::Idle);
    }

    #[test]
    fn test_scroll_input_cancels_glide() {
        let mut s = sized_scroller();
        s.glide_to(500.0, 1000.0);
        s.tick(1.0 / 60.0);

        s.apply_scroll_delta(10.0);
        assert_eq!(s.motion(), ScrollMotion::Scrolling);

        // Subsequent ticks no longer advance toward the glide target
        let offset = s.offset();
        s.tick(1.0 / 60.0);
        assert_eq!(s.offset(), offset);
    }

    #[test]
    fn test_glide_clamps_to_content() {
        let mut s = sized_scroller();
        s.glide_to(10_000.0, 100.0);
        for _ in 0..30 {
            s.tick(1.0 / 60.0);
        }
        assert_eq!(s.offset(), s.max_offset());
    }
}
