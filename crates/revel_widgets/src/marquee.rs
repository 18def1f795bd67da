//! Marquee offset
//!
//! A continuously scrolling horizontal strip. The content is laid out
//! repeated, so the offset wraps at one content-span and the loop is
//! seamless. Hovering pauses the drift, leaving resumes it.

/// Looping horizontal marquee offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    offset: f32,
    /// Drift speed in px/s
    speed: f32,
    /// Width of one repetition of the content
    span: f32,
    paused: bool,
}

impl Marquee {
    pub fn new(span: f32, speed: f32) -> Self {
        Self {
            offset: 0.0,
            speed,
            span: span.max(1.0),
            paused: false,
        }
    }

    /// Current x offset in [-span, 0]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Content reflowed; keep the relative loop position
    pub fn set_span(&mut self, span: f32) {
        let span = span.max(1.0);
        self.offset = self.offset / self.span * span;
        self.span = span;
    }

    pub fn pointer_enter(&mut self) {
        self.paused = true;
    }

    pub fn pointer_leave(&mut self) {
        self.paused = false;
    }

    /// Advance the drift by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.offset -= self.speed * dt;
        while self.offset <= -self.span {
            self.offset += self.span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drifts_left_and_wraps() {
        let mut m = Marquee::new(100.0, 50.0);
        m.tick(1.0);
        assert_eq!(m.offset(), -50.0);

        m.tick(1.0);
        // Wrapped: -100 folds back to 0
        assert_eq!(m.offset(), 0.0);

        m.tick(0.5);
        assert_eq!(m.offset(), -25.0);
    }

    #[test]
    fn test_hover_pauses() {
        let mut m = Marquee::new(100.0, 50.0);
        m.tick(0.5);
        let held = m.offset();

        m.pointer_enter();
        m.tick(5.0);
        assert_eq!(m.offset(), held);

        m.pointer_leave();
        m.tick(0.1);
        assert!(m.offset() < held);
    }

    #[test]
    fn test_offset_stays_in_loop_range() {
        let mut m = Marquee::new(30.0, 200.0);
        for _ in 0..100 {
            m.tick(0.016);
            assert!(m.offset() <= 0.0 && m.offset() > -30.0);
        }
    }

    #[test]
    fn test_set_span_preserves_relative_position() {
        let mut m = Marquee::new(100.0, 50.0);
        m.tick(1.0);
        assert_eq!(m.offset(), -50.0);

        m.set_span(200.0);
        assert_eq!(m.offset(), -100.0);
    }
}
