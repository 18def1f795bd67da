//! Seekable property timelines
//!
//! A `Timeline` is an ordered list of segments, each tweening a set of
//! style properties on one target between explicit from/to states. The
//! whole timeline can be played on the clock (`play`/`reverse`/`tick`) or
//! scrubbed directly to a progress fraction (`seek`), which is how scroll
//! binding drives it.
//!
//! Segment placement mirrors the usual timeline-authoring vocabulary:
//! append after the previous segment, start together with it, or overlap it
//! by a signed offset.
//!
//! # Example
//!
//! ```rust
//! use revel_animation::{Easing, StyleState, Timeline, Tween};
//! use revel_core::{Rect, TargetRegistry};
//!
//! let mut reg = TargetRegistry::new();
//! let logo = reg.register("logo", Rect::new(0.0, 0.0, 600.0, 200.0));
//!
//! let mut tl = Timeline::new();
//! tl.from_to(
//!     &mut reg,
//!     logo,
//!     StyleState::new().opacity(0.0).scale(1.4),
//!     StyleState::new().opacity(1.0).scale(1.0),
//!     Tween::duration(1200.0).ease(Easing::EaseOut),
//! )
//! .unwrap();
//!
//! tl.seek(0.5, &mut reg);
//! let style = reg.style(logo).unwrap();
//! assert!(style.opacity > 0.0 && style.opacity < 1.0);
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use revel_core::{Error, StyleProperty, TargetId, TargetRegistry};

use crate::easing::Easing;

/// A partial style specification: only the listed properties participate
#[derive(Clone, Debug, Default)]
pub struct StyleState {
    props: SmallVec<[(StyleProperty, f32); 4]>,
}

impl StyleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, prop: StyleProperty, value: f32) -> Self {
        self.props.push((prop, value));
        self
    }

    pub fn opacity(self, v: f32) -> Self {
        self.set(StyleProperty::Opacity, v)
    }

    pub fn translate_x(self, v: f32) -> Self {
        self.set(StyleProperty::TranslateX, v)
    }

    pub fn translate_y(self, v: f32) -> Self {
        self.set(StyleProperty::TranslateY, v)
    }

    pub fn scale(self, v: f32) -> Self {
        self.set(StyleProperty::Scale, v)
    }

    pub fn blur(self, v: f32) -> Self {
        self.set(StyleProperty::Blur, v)
    }

    pub fn clip_inset(self, v: f32) -> Self {
        self.set(StyleProperty::ClipInset, v)
    }

    pub fn hue_rotate(self, v: f32) -> Self {
        self.set(StyleProperty::HueRotate, v)
    }

    pub fn lookup(&self, prop: StyleProperty) -> Option<f32> {
        self.props.iter().find(|(p, _)| *p == prop).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleProperty, f32)> + '_ {
        self.props.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Where a new segment lands on the timeline
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Position {
    /// After the previous segment ends (the default)
    #[default]
    AfterPrevious,
    /// Same start time as the previous segment
    WithPrevious,
    /// Offset in ms from the previous segment's end (negative = overlap)
    RelativeToPrevious(f32),
    /// Absolute time from timeline start
    At(f32),
    /// At a named label added with [`Timeline::add_label`]
    AtLabel(String),
}

/// Per-segment tween options
#[derive(Clone, Debug)]
pub struct Tween {
    pub duration_ms: f32,
    pub ease: Easing,
    pub position: Position,
    /// Alignment group: segments sharing a group must not regress in start
    /// time relative to each other
    pub align: Option<String>,
}

impl Default for Tween {
    fn default() -> Self {
        Self {
            duration_ms: 1000.0,
            ease: Easing::Linear,
            position: Position::AfterPrevious,
            align: None,
        }
    }
}

impl Tween {
    pub fn duration(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            ..Default::default()
        }
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn align(mut self, group: impl Into<String>) -> Self {
        self.align = Some(group.into());
        self
    }
}

/// One property transition on the timeline
#[derive(Clone, Debug)]
pub struct Segment {
    pub target: TargetId,
    pub tracks: SmallVec<[(StyleProperty, f32, f32); 4]>,
    pub start_ms: f32,
    pub duration_ms: f32,
    pub ease: Easing,
}

impl Segment {
    fn end_ms(&self) -> f32 {
        self.start_ms + self.duration_ms
    }

    /// Normalized local time for an absolute timeline time
    fn local_t(&self, time_ms: f32) -> f32 {
        if self.duration_ms <= f32::EPSILON {
            if time_ms >= self.start_ms {
                1.0
            } else {
                0.0
            }
        } else {
            ((time_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
        }
    }
}

/// An ordered, seekable sequence of property segments
pub struct Timeline {
    segments: Vec<Segment>,
    labels: FxHashMap<String, f32>,
    /// (target, property) pairs already claimed, for the first-mutation rule
    seen: FxHashSet<(TargetId, StyleProperty)>,
    /// Last start time recorded per alignment group
    align_cursor: FxHashMap<String, f32>,
    duration_ms: f32,
    current_ms: f32,
    playing: bool,
    reversed: bool,
    looping: bool,
    yoyo: bool,
    /// Allow `seek` past [0,1] (pin regions during fast scroll)
    overshoot_tolerant: bool,
    killed: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            labels: FxHashMap::default(),
            seen: FxHashSet::default(),
            align_cursor: FxHashMap::default(),
            duration_ms: 0.0,
            current_ms: 0.0,
            playing: false,
            reversed: false,
            looping: false,
            yoyo: false,
            overshoot_tolerant: false,
            killed: false,
        }
    }

    /// Permit seeking past [0,1] without clamping timeline progress
    pub fn overshoot_tolerant(mut self) -> Self {
        self.overshoot_tolerant = true;
        self
    }

    /// Wrap back to the start when playback reaches the end
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Reverse direction at each end instead of wrapping (implies looping)
    pub fn set_yoyo(&mut self, yoyo: bool) {
        self.yoyo = yoyo;
        if yoyo {
            self.looping = true;
        }
    }

    /// Record a named label at the current end of the timeline
    pub fn add_label(&mut self, name: impl Into<String>) {
        self.labels.insert(name.into(), self.duration_ms);
    }

    /// Append a segment tweening `target` from one style state to another
    ///
    /// The from-state is written to the registry immediately for every
    /// (target, property) pair this timeline has not touched before, so
    /// content never flashes its resting style before the first seek.
    pub fn from_to(
        &mut self,
        registry: &mut TargetRegistry,
        target: TargetId,
        from: StyleState,
        to: StyleState,
        tween: Tween,
    ) -> Result<(), Error> {
        if self.killed {
            tracing::debug!("from_to on killed timeline ignored");
            return Ok(());
        }

        let start_ms = self.resolve_position(&tween.position);

        if let Some(ref group) = tween.align {
            if let Some(&last) = self.align_cursor.get(group) {
                if start_ms < last {
                    return Err(Error::SegmentOrder {
                        align: group.clone(),
                    });
                }
            }
            self.align_cursor.insert(group.clone(), start_ms);
        }

        let mut tracks: SmallVec<[(StyleProperty, f32, f32); 4]> = SmallVec::new();
        for (prop, to_value) in to.iter() {
            let from_value = from
                .lookup(prop)
                .or_else(|| registry.style(target).map(|s| s.get(prop)))
                .unwrap_or_default();
            tracks.push((prop, from_value, to_value));

            if self.seen.insert((target, prop)) {
                if let Some(sink) = registry.style_mut(target) {
                    sink.set(prop, from_value);
                }
            }
        }

        self.duration_ms = self.duration_ms.max(start_ms + tween.duration_ms);
        self.segments.push(Segment {
            target,
            tracks,
            start_ms,
            duration_ms: tween.duration_ms,
            ease: tween.ease,
        });
        Ok(())
    }

    fn resolve_position(&self, position: &Position) -> f32 {
        let prev = self.segments.last();
        match position {
            Position::AfterPrevious => prev.map(|s| s.end_ms()).unwrap_or(0.0),
            Position::WithPrevious => prev.map(|s| s.start_ms).unwrap_or(0.0),
            Position::RelativeToPrevious(offset) => {
                (prev.map(|s| s.end_ms()).unwrap_or(0.0) + offset).max(0.0)
            }
            Position::At(ms) => ms.max(0.0),
            Position::AtLabel(name) => self.labels.get(name).copied().unwrap_or(0.0),
        }
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn progress(&self) -> f32 {
        if self.duration_ms <= f32::EPSILON {
            return 0.0;
        }
        self.current_ms / self.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Scrub to a progress fraction and write the resulting styles
    ///
    /// Progress clamps to [0,1] unless the timeline is overshoot-tolerant;
    /// even then each segment's visual output stays within its own from/to
    /// interpolation (the ease may overshoot, the local time does not).
    pub fn seek(&mut self, progress: f32, registry: &mut TargetRegistry) {
        if self.killed {
            return;
        }
        let progress = if self.overshoot_tolerant {
            progress
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.current_ms = progress * self.duration_ms;
        self.write_styles(registry);
    }

    /// Resume playback toward the end
    pub fn play(&mut self) {
        if self.killed {
            return;
        }
        if self.current_ms >= self.duration_ms {
            self.current_ms = 0.0;
        }
        self.reversed = false;
        self.playing = true;
    }

    /// Resume playback toward the start
    pub fn reverse(&mut self) {
        if self.killed {
            return;
        }
        self.reversed = true;
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Advance clock-driven playback
    pub fn tick(&mut self, dt_ms: f32, registry: &mut TargetRegistry) {
        if !self.playing || self.killed {
            return;
        }

        if self.reversed {
            self.current_ms -= dt_ms;
            if self.current_ms <= 0.0 {
                if self.yoyo {
                    self.current_ms = -self.current_ms;
                    self.reversed = false;
                } else if self.looping {
                    self.current_ms += self.duration_ms;
                } else {
                    self.current_ms = 0.0;
                    self.playing = false;
                }
            }
        } else {
            self.current_ms += dt_ms;
            if self.current_ms >= self.duration_ms {
                if self.yoyo {
                    self.current_ms = 2.0 * self.duration_ms - self.current_ms;
                    self.reversed = true;
                } else if self.looping {
                    self.current_ms -= self.duration_ms;
                } else {
                    self.current_ms = self.duration_ms;
                    self.playing = false;
                }
            }
        }

        self.write_styles(registry);
    }

    /// Detach from all targets and drop segments; safe to call repeatedly
    pub fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        self.playing = false;
        self.segments.clear();
        self.labels.clear();
        self.seen.clear();
        self.align_cursor.clear();
    }

    /// Write the style values for the current time into the registry
    ///
    /// For each (target, property) the segment that started most recently
    /// wins; properties whose every segment is still in the future hold
    /// their declared from values, so seeking to 0 always reproduces the
    /// initial state exactly.
    fn write_styles(&self, registry: &mut TargetRegistry) {
        let t = self.current_ms;
        // (start that won, value); future segments marked with -inf start
        let mut winners: FxHashMap<(TargetId, StyleProperty), (f32, f32)> = FxHashMap::default();

        for seg in &self.segments {
            if seg.start_ms <= t {
                let eased = seg.ease.apply(seg.local_t(t));
                for &(prop, from, to) in &seg.tracks {
                    let value = from + (to - from) * eased;
                    let key = (seg.target, prop);
                    let superseded = winners
                        .get(&key)
                        .is_some_and(|&(start, _)| start > seg.start_ms);
                    if !superseded {
                        winners.insert(key, (seg.start_ms, value));
                    }
                }
            } else {
                for &(prop, from, _) in &seg.tracks {
                    winners
                        .entry((seg.target, prop))
                        .or_insert((f32::NEG_INFINITY, from));
                }
            }
        }

        for ((target, prop), (_, value)) in winners {
            if let Some(sink) = registry.style_mut(target) {
                sink.set(prop, value);
            }
        }
    }
}
