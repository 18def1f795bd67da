//! Scroll-progress binding
//!
//! Binds a trigger range to a timeline: every frame the engine hands each
//! binder the shared scroll-offset snapshot and the binder seeks its
//! timeline to the mapped progress, optionally low-pass filtered by the
//! trigger's scrub coefficient.

use revel_animation::Timeline;
use revel_core::{Error, TargetRegistry};

use crate::trigger::{ResolvedRange, TriggerSpec};

/// A trigger bound to a timeline
pub struct ScrollBinder {
    spec: TriggerSpec,
    timeline: Timeline,
    range: Option<ResolvedRange>,
    /// Smoothed progress shown to the timeline when scrub > 0
    displayed: f32,
    /// First update snaps to the raw progress instead of lagging from 0
    primed: bool,
    /// Cleared when a resize re-resolution turns the range degenerate
    active: bool,
}

impl ScrollBinder {
    /// Create a binder; the range stays unresolved until the target and
    /// scroller are both sized
    pub fn new(spec: TriggerSpec, timeline: Timeline) -> Result<Self, Error> {
        spec.validate()?;
        Ok(Self {
            spec,
            timeline,
            range: None,
            displayed: 0.0,
            primed: false,
            active: true,
        })
    }

    pub fn spec(&self) -> &TriggerSpec {
        &self.spec
    }

    pub fn is_resolved(&self) -> bool {
        self.range.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn range(&self) -> Option<ResolvedRange> {
        self.range
    }

    pub fn displayed_progress(&self) -> f32 {
        self.displayed
    }

    /// Resolve (or re-resolve after resize) the trigger range
    ///
    /// Environment transience (missing target, unsized viewport) leaves
    /// the binder pending. A degenerate resolution deactivates it.
    pub fn resolve(&mut self, registry: &TargetRegistry, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let Some(bounds) = registry.bounds(self.spec.target) else {
            return;
        };
        match self.spec.resolve(bounds, viewport_height) {
            Ok(range) => {
                self.range = Some(range);
                self.active = true;
            }
            Err(err) => {
                tracing::warn!(%err, "trigger range degenerate, binder deactivated");
                self.range = None;
                self.active = false;
            }
        }
    }

    /// Seek the timeline for this frame's shared offset snapshot
    pub fn update(&mut self, offset_snapshot: f32, dt: f32, registry: &mut TargetRegistry) {
        if !self.active {
            return;
        }
        let Some(range) = self.range else {
            return;
        };

        let raw = range.progress(offset_snapshot);
        if !self.primed || self.spec.scrub <= f32::EPSILON {
            self.displayed = raw;
            self.primed = true;
        } else {
            let alpha = (dt / self.spec.scrub).min(1.0);
            self.displayed += (raw - self.displayed) * alpha;
        }

        self.timeline.seek(self.displayed, registry);
    }

    /// Kill the bound timeline; the binder becomes inert
    pub fn kill(&mut self) {
        self.timeline.kill();
        self.active = false;
    }
}
