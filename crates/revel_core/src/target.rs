//! Target registry and style sinks
//!
//! The render layer registers each animatable region and receives an opaque
//! `TargetId`. Animation code never holds render-tree nodes: it resolves an
//! id to a mutable `StyleSink` at bind time and writes style values into
//! it; the renderer samples sinks when painting.
//!
//! Sinks default to their resting values, so a page whose animation layer
//! never runs still renders fully visible content.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::geometry::Rect;

new_key_type! {
    /// Handle to a registered target region
    pub struct TargetId;
}

/// Style properties a timeline can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    /// Gaussian blur radius in pixels
    Blur,
    /// Symmetric vertical clip as a fraction of height (0 = no clip)
    ClipInset,
    /// Hue rotation in degrees
    HueRotate,
}

/// Mutable style values for one target
///
/// Values are stored exactly as written; overshooting eases may transiently
/// push them outside their natural domain. [`StyleSink::rendered`] clamps
/// the properties that have one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleSink {
    pub opacity: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    pub blur: f32,
    pub clip_inset: f32,
    pub hue_rotate: f32,
}

impl Default for StyleSink {
    fn default() -> Self {
        // Resting state: fully visible, untransformed
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            blur: 0.0,
            clip_inset: 0.0,
            hue_rotate: 0.0,
        }
    }
}

impl StyleSink {
    pub fn get(&self, prop: StyleProperty) -> f32 {
        match prop {
            StyleProperty::Opacity => self.opacity,
            StyleProperty::TranslateX => self.translate_x,
            StyleProperty::TranslateY => self.translate_y,
            StyleProperty::Scale => self.scale,
            StyleProperty::Blur => self.blur,
            StyleProperty::ClipInset => self.clip_inset,
            StyleProperty::HueRotate => self.hue_rotate,
        }
    }

    pub fn set(&mut self, prop: StyleProperty, value: f32) {
        match prop {
            StyleProperty::Opacity => self.opacity = value,
            StyleProperty::TranslateX => self.translate_x = value,
            StyleProperty::TranslateY => self.translate_y = value,
            StyleProperty::Scale => self.scale = value,
            StyleProperty::Blur => self.blur = value,
            StyleProperty::ClipInset => self.clip_inset = value,
            StyleProperty::HueRotate => self.hue_rotate = value,
        }
    }

    /// Values as the renderer should apply them, with natural domains
    /// clamped (opacity to [0,1], blur/clip to non-negative)
    pub fn rendered(&self) -> StyleSink {
        StyleSink {
            opacity: self.opacity.clamp(0.0, 1.0),
            blur: self.blur.max(0.0),
            clip_inset: self.clip_inset.clamp(0.0, 1.0),
            ..*self
        }
    }

    /// Reset to resting values
    pub fn reset(&mut self) {
        *self = StyleSink::default();
    }
}

struct TargetEntry {
    name: String,
    bounds: Rect,
    style: StyleSink,
    attached: bool,
}

/// Registry of animatable regions, owned by the render layer
///
/// Bounds changes bump a revision counter so bound triggers know to
/// re-resolve their offsets rather than re-clamp stale ones.
#[derive(Default)]
pub struct TargetRegistry {
    targets: SlotMap<TargetId, TargetEntry>,
    by_name: FxHashMap<String, TargetId>,
    revision: u64,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region under a stable name, returning its handle
    ///
    /// Re-registering a name replaces the lookup entry; the old target
    /// stays valid until removed (the render layer controls lifetime).
    pub fn register(&mut self, name: impl Into<String>, bounds: Rect) -> TargetId {
        let name = name.into();
        let id = self.targets.insert(TargetEntry {
            name: name.clone(),
            bounds,
            style: StyleSink::default(),
            attached: true,
        });
        self.by_name.insert(name, id);
        self.revision += 1;
        id
    }

    /// Look up a target by its registered name
    pub fn lookup(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.targets.contains_key(id)
    }

    /// Whether the target is still attached to the render tree
    pub fn is_attached(&self, id: TargetId) -> bool {
        self.targets.get(id).map(|t| t.attached).unwrap_or(false)
    }

    pub fn bounds(&self, id: TargetId) -> Option<Rect> {
        self.targets.get(id).map(|t| t.bounds)
    }

    /// Update a target's bounds (layout/resize pass)
    pub fn set_bounds(&mut self, id: TargetId, bounds: Rect) {
        if let Some(t) = self.targets.get_mut(id) {
            t.bounds = bounds;
            self.revision += 1;
        }
    }

    /// An image inside the target finished loading late; bounds may have
    /// grown. Same effect as a resize for anything bound to this target.
    pub fn notify_image_loaded(&mut self, id: TargetId, bounds: Rect) {
        if let Some(t) = self.targets.get_mut(id) {
            tracing::debug!(target_name = %t.name, "image loaded, recomputing bounds");
            t.bounds = bounds;
            self.revision += 1;
        }
    }

    pub fn style(&self, id: TargetId) -> Option<&StyleSink> {
        self.targets.get(id).map(|t| &t.style)
    }

    pub fn style_mut(&mut self, id: TargetId) -> Option<&mut StyleSink> {
        self.targets.get_mut(id).map(|t| &mut t.style)
    }

    /// Mark a target as detached without removing it
    ///
    /// A pinned region whose target detaches must force-unpin; keeping the
    /// entry lets late style writes no-op safely instead of resolving to a
    /// recycled id.
    pub fn detach(&mut self, id: TargetId) {
        if let Some(t) = self.targets.get_mut(id) {
            t.attached = false;
            self.revision += 1;
        }
    }

    /// Remove a target entirely (owning section unmounted)
    pub fn remove(&mut self, id: TargetId) {
        if let Some(entry) = self.targets.remove(id) {
            if self.by_name.get(&entry.name) == Some(&id) {
                self.by_name.remove(&entry.name);
            }
            self.revision += 1;
        }
    }

    /// Monotonic counter bumped on every bounds change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
