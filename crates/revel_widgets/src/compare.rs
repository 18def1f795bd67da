//! Before/after compare slider
//!
//! A draggable divider over two stacked images. The drag is captured
//! globally: once it starts, pointer moves keep updating the divider even
//! outside the slider bounds, and releasing anywhere ends it. Bounds are
//! supplied by the host and recomputed when images finish loading.

use revel_core::{event_types, Point, PointerEvent, Rect};

/// Divider position as a fraction of container width
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSlider {
    bounds: Rect,
    fraction: f32,
    dragging: bool,
}

impl CompareSlider {
    /// Divider starts centered
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            fraction: 0.5,
            dragging: false,
        }
    }

    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Update container bounds (resize or late image load); the fraction
    /// is retained so the divider keeps its relative position
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Pointer pressed; starts a drag only inside the slider bounds
    pub fn pointer_down(&mut self, position: Point) {
        if self.bounds.contains(position) {
            self.dragging = true;
            self.apply(position.x);
        }
    }

    /// Pointer moved; position may be anywhere once a drag is captured
    pub fn pointer_move(&mut self, position: Point) {
        if self.dragging {
            self.apply(position.x);
        }
    }

    /// Pointer released anywhere, including outside the element
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Route a host pointer event to the drag machine
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.event_type {
            event_types::POINTER_DOWN => self.pointer_down(event.position),
            event_types::POINTER_MOVE => self.pointer_move(event.position),
            event_types::POINTER_UP => self.pointer_up(),
            _ => {}
        }
    }

    fn apply(&mut self, x: f32) {
        if self.bounds.width <= 0.0 {
            return;
        }
        self.fraction = ((x - self.bounds.x) / self.bounds.width).clamp(0.0, 1.0);
    }
}
