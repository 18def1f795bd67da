//! Scroll triggers
//!
//! A trigger ties a target region to a range of scroll offsets. Start and
//! end are expressed as "element edge meets viewport fraction" conditions
//! ("top of the target reaches 75% down the viewport") or, for pinned
//! ranges, as a span past the start. Resolution happens against live
//! bounds and is repeated whenever bounds or viewport change.

use revel_core::{Edge, Error, Rect, TargetId};

/// "Element edge at viewport fraction" condition
///
/// The condition is met when the given edge of the target, in content
/// coordinates, lines up with `viewport_fraction` of the way down the
/// scroller viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCondition {
    pub edge: Edge,
    pub viewport_fraction: f32,
}

impl EdgeCondition {
    pub fn new(edge: Edge, viewport_fraction: f32) -> Self {
        Self {
            edge,
            viewport_fraction,
        }
    }

    /// "top top": element top at viewport top
    pub fn top_top() -> Self {
        Self::new(Edge::Top, 0.0)
    }

    /// "top 75%": element top three quarters down the viewport
    pub fn top_at(fraction: f32) -> Self {
        Self::new(Edge::Top, fraction)
    }

    pub fn bottom_at(fraction: f32) -> Self {
        Self::new(Edge::Bottom, fraction)
    }

    /// Scroll offset at which this condition is met
    pub fn resolve(&self, bounds: Rect, viewport_height: f32) -> f32 {
        bounds.edge(self.edge) - viewport_height * self.viewport_fraction
    }
}

/// How a trigger's end offset is derived
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EndCondition {
    /// Another edge condition
    Edge(EdgeCondition),
    /// A fixed span past the start, in viewport heights (1.0 = "+=100%")
    SpanViewport(f32),
    /// A fixed span past the start, in pixels
    SpanPx(f32),
}

/// A resolved trigger range in absolute scroll offsets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRange {
    pub start: f32,
    pub end: f32,
}

impl ResolvedRange {
    /// Fraction of the range traversed at `offset`, clamped to [0,1]
    pub fn progress(&self, offset: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            if offset >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            ((offset - self.start) / span).clamp(0.0, 1.0)
        }
    }

    /// Like [`progress`](Self::progress) but unclamped, for pin phase math
    pub fn raw_progress(&self, offset: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            if offset >= self.start {
                1.0
            } else {
                0.0
            }
        } else {
            (offset - self.start) / span
        }
    }
}

/// Declarative trigger: target + start/end conditions + scrub smoothing
#[derive(Clone, Debug)]
pub struct TriggerSpec {
    pub target: TargetId,
    pub start: EdgeCondition,
    pub end: EndCondition,
    /// Smoothing time constant in seconds; 0 = jump straight to progress
    pub scrub: f32,
}

impl TriggerSpec {
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            start: EdgeCondition::top_at(0.75),
            end: EndCondition::Edge(EdgeCondition::top_at(0.25)),
            scrub: 0.0,
        }
    }

    pub fn start(mut self, condition: EdgeCondition) -> Self {
        self.start = condition;
        self
    }

    pub fn end(mut self, condition: EdgeCondition) -> Self {
        self.end = EndCondition::Edge(condition);
        self
    }

    /// End the range a number of viewport heights past the start
    pub fn span_viewport(mut self, viewports: f32) -> Self {
        self.end = EndCondition::SpanViewport(viewports);
        self
    }

    pub fn span_px(mut self, px: f32) -> Self {
        self.end = EndCondition::SpanPx(px);
        self
    }

    pub fn scrub(mut self, seconds: f32) -> Self {
        self.scrub = seconds;
        self
    }

    /// Validate static configuration (scrub coefficient)
    pub fn validate(&self) -> Result<(), Error> {
        if self.scrub < 0.0 {
            return Err(Error::InvalidScrub(self.scrub));
        }
        Ok(())
    }

    /// Resolve both conditions against live bounds
    ///
    /// A range whose start lands past its end is degenerate and rejected;
    /// it must never activate.
    pub fn resolve(&self, bounds: Rect, viewport_height: f32) -> Result<ResolvedRange, Error> {
        let start = self.start.resolve(bounds, viewport_height);
        let end = match self.end {
            EndCondition::Edge(cond) => cond.resolve(bounds, viewport_height),
            EndCondition::SpanViewport(v) => start + viewport_height * v,
            EndCondition::SpanPx(px) => start + px,
        };
        if start > end {
            return Err(Error::DegenerateRange { start, end });
        }
        Ok(ResolvedRange { start, end })
    }
}
