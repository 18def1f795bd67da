//! Pinned scroll ranges
//!
//! A pin freezes its region at the viewport for the duration of a scroll
//! range, converting continued scrolling into internal timeline progress
//! ("scroll hijacking" for cross-fade/zoom hand-offs between stacked
//! regions). Crossing the range boundaries emits discrete phase-change
//! notifications in both directions.

use revel_animation::Timeline;
use revel_core::{Error, TargetRegistry};

use crate::trigger::{ResolvedRange, TriggerSpec};

/// Pin region phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinPhase {
    BeforeRange,
    Pinned,
    AfterRange,
}

type PhaseCallback = Box<dyn FnMut() + Send>;

/// Phase-change notifications for a pin region
#[derive(Default)]
pub struct PinCallbacks {
    on_enter: Option<PhaseCallback>,
    on_leave: Option<PhaseCallback>,
    on_enter_back: Option<PhaseCallback>,
    on_leave_back: Option<PhaseCallback>,
}

impl PinCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired on BEFORE_RANGE → PINNED scrolling forward
    pub fn on_enter(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Fired on PINNED → AFTER_RANGE scrolling forward
    pub fn on_leave(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }

    /// Fired on AFTER_RANGE → PINNED scrolling backward
    pub fn on_enter_back(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_enter_back = Some(Box::new(f));
        self
    }

    /// Fired on PINNED → BEFORE_RANGE scrolling backward
    pub fn on_leave_back(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_leave_back = Some(Box::new(f));
        self
    }
}

/// Controller for one pinned scroll range
pub struct PinController {
    spec: TriggerSpec,
    timeline: Timeline,
    callbacks: PinCallbacks,
    range: Option<ResolvedRange>,
    phase: Option<PinPhase>,
    displayed: f32,
    primed: bool,
    last_offset: f32,
    /// +1 scrolling forward, -1 backward; drives forced-unpin resolution
    last_direction: f32,
    killed: bool,
}

impl PinController {
    /// Create a pin controller; the internal timeline is made
    /// overshoot-tolerant so rapid scroll past the boundary does not clamp
    /// its progress mid-frame
    pub fn new(
        spec: TriggerSpec,
        timeline: Timeline,
        callbacks: PinCallbacks,
    ) -> Result<Self, Error> {
        spec.validate()?;
        Ok(Self {
            spec,
            timeline: timeline.overshoot_tolerant(),
            callbacks,
            range: None,
            phase: None,
            displayed: 0.0,
            primed: false,
            last_offset: 0.0,
            last_direction: 1.0,
            killed: false,
        })
    }

    pub fn spec(&self) -> &TriggerSpec {
        &self.spec
    }

    pub fn phase(&self) -> Option<PinPhase> {
        self.phase
    }

    pub fn range(&self) -> Option<ResolvedRange> {
        self.range
    }

    pub fn is_resolved(&self) -> bool {
        self.range.is_some()
    }

    /// Resolve the pinned range; the initial phase is computed from the
    /// current offset, never assumed BEFORE_RANGE (the page may load
    /// already scrolled into or past the range)
    pub fn resolve(
        &mut self,
        registry: &TargetRegistry,
        viewport_height: f32,
        offset: f32,
    ) -> Result<(), Error> {
        if self.killed || viewport_height <= 0.0 {
            return Ok(());
        }
        let Some(bounds) = registry.bounds(self.spec.target) else {
            return Ok(());
        };
        let range = self.spec.resolve(bounds, viewport_height)?;
        self.range = Some(range);
        if self.phase.is_none() {
            self.phase = Some(if offset < range.start {
                PinPhase::BeforeRange
            } else if offset <= range.end {
                PinPhase::Pinned
            } else {
                PinPhase::AfterRange
            });
            self.last_offset = offset;
        }
        Ok(())
    }

    /// Advance phases and the internal timeline for this frame's offset
    pub fn update(&mut self, offset: f32, dt: f32, registry: &mut TargetRegistry) {
        if self.killed {
            return;
        }
        let (Some(range), Some(mut phase)) = (self.range, self.phase) else {
            return;
        };

        if phase == PinPhase::Pinned && !registry.is_attached(self.spec.target) {
            self.force_unpin(registry);
            return;
        }

        let delta = offset - self.last_offset;
        if delta.abs() > f32::EPSILON {
            self.last_direction = delta.signum();
        }
        self.last_offset = offset;

        // A single frame can jump across the whole range; walk the phase
        // machine until it is consistent with the offset so every boundary
        // crossing emits exactly one notification.
        loop {
            let next = match phase {
                PinPhase::BeforeRange if offset >= range.start => {
                    Self::fire(&mut self.callbacks.on_enter);
                    Some(PinPhase::Pinned)
                }
                PinPhase::Pinned if offset > range.end => {
                    Self::fire(&mut self.callbacks.on_leave);
                    Some(PinPhase::AfterRange)
                }
                PinPhase::Pinned if offset < range.start => {
                    Self::fire(&mut self.callbacks.on_leave_back);
                    Some(PinPhase::BeforeRange)
                }
                PinPhase::AfterRange if offset <= range.end => {
                    Self::fire(&mut self.callbacks.on_enter_back);
                    Some(PinPhase::Pinned)
                }
                _ => None,
            };
            match next {
                Some(p) => phase = p,
                None => break,
            }
        }
        self.phase = Some(phase);

        // While pinned the traversed fraction drives the internal
        // timeline, smoothed by the scrub coefficient; outside the range
        // the timeline rests exactly at its boundary state.
        let raw = if phase == PinPhase::Pinned {
            range.raw_progress(offset)
        } else {
            range.progress(offset)
        };
        if !self.primed || self.spec.scrub <= f32::EPSILON {
            self.displayed = raw;
            self.primed = true;
        } else {
            let alpha = (dt / self.spec.scrub).min(1.0);
            self.displayed += (raw - self.displayed) * alpha;
        }
        self.timeline.seek(self.displayed, registry);

        self.write_pin_offset(offset, registry);
    }

    /// Freeze the region at the viewport while pinned: the target tracks
    /// the scroll offset across the range, and holds the full span after
    fn write_pin_offset(&self, offset: f32, registry: &mut TargetRegistry) {
        let Some(range) = self.range else {
            return;
        };
        let shift = match self.phase {
            Some(PinPhase::BeforeRange) | None => 0.0,
            Some(PinPhase::Pinned) => offset.clamp(range.start, range.end) - range.start,
            Some(PinPhase::AfterRange) => range.end - range.start,
        };
        if let Some(sink) = registry.style_mut(self.spec.target) {
            sink.translate_y = shift;
        }
    }

    /// Recover from a detached target: unpin toward the last known scroll
    /// direction instead of leaving the region frozen
    pub fn force_unpin(&mut self, registry: &mut TargetRegistry) {
        if self.phase != Some(PinPhase::Pinned) {
            return;
        }
        let resolved = if self.last_direction >= 0.0 {
            PinPhase::AfterRange
        } else {
            PinPhase::BeforeRange
        };
        tracing::warn!(?resolved, "pin target detached while pinned, forcing unpin");
        self.phase = Some(resolved);
        let progress = if resolved == PinPhase::AfterRange {
            1.0
        } else {
            0.0
        };
        self.displayed = progress;
        self.timeline.seek(progress, registry);
        self.write_pin_offset(self.last_offset, registry);
    }

    /// Kill the internal timeline and stop updating; idempotent
    pub fn kill(&mut self) {
        self.killed = true;
        self.timeline.kill();
        self.range = None;
    }

    fn fire(callback: &mut Option<PhaseCallback>) {
        if let Some(f) = callback {
            f();
        }
    }
}
