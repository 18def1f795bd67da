//! Scroll orchestration engine
//!
//! One engine per scroller. It owns the binders, pin controllers, condition
//! groups, and anchor registry, and advances everything once per host
//! frame. Within one `tick` every bound timeline is seeked from the same
//! scroll-offset snapshot, so two effects can never observe torn reads of
//! the scroll position in the same frame.
//!
//! Callbacks fired during a tick (pin phase changes, condition flips) must
//! stay lightweight flag-setters; they run with engine locks held.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use revel_animation::Timeline;
use revel_core::{Error, Size, TargetId, TargetRegistry};

use crate::binder::ScrollBinder;
use crate::condition::{ConditionCallback, ConditionGroup, ConditionWatcher, WatchId};
use crate::pin::{PinCallbacks, PinController};
use crate::scroller::{ScrollConfig, Scroller};
use crate::trigger::TriggerSpec;

new_key_type! {
    /// Handle to a bound scroll timeline
    pub struct BinderId;
    /// Handle to a pin controller
    pub struct PinId;
}

/// Handle to a registered condition group
pub type GroupId = u64;

/// The registry shared between the render layer and the engine
///
/// The render layer is the owner; the engine only references it.
pub type SharedTargetRegistry = Arc<Mutex<TargetRegistry>>;

/// Default anchor glide duration in ms
const ANCHOR_GLIDE_MS: f32 = 600.0;

pub struct ScrollEngine {
    registry: SharedTargetRegistry,
    scroller: Arc<Mutex<Scroller>>,
    binders: Arc<Mutex<SlotMap<BinderId, ScrollBinder>>>,
    pins: Arc<Mutex<SlotMap<PinId, PinController>>>,
    watcher: Arc<Mutex<ConditionWatcher>>,
    groups: Arc<Mutex<FxHashMap<GroupId, ConditionGroup>>>,
    anchors: Arc<Mutex<FxHashMap<String, TargetId>>>,
    next_group_id: AtomicU64,
    /// Registry revision the triggers were last resolved against
    resolved_revision: AtomicU64,
    /// Set on viewport change to force re-resolution next tick
    needs_resolve: AtomicBool,
}

impl ScrollEngine {
    pub fn new(registry: SharedTargetRegistry, config: ScrollConfig) -> Self {
        Self {
            registry,
            scroller: Arc::new(Mutex::new(Scroller::new(config))),
            binders: Arc::new(Mutex::new(SlotMap::with_key())),
            pins: Arc::new(Mutex::new(SlotMap::with_key())),
            watcher: Arc::new(Mutex::new(ConditionWatcher::new(Size::default()))),
            groups: Arc::new(Mutex::new(FxHashMap::default())),
            anchors: Arc::new(Mutex::new(FxHashMap::default())),
            next_group_id: AtomicU64::new(1),
            resolved_revision: AtomicU64::new(0),
            needs_resolve: AtomicBool::new(true),
        }
    }

    /// Weak handle for disposers and variant-attach closures
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            registry: Arc::downgrade(&self.registry),
            scroller: Arc::downgrade(&self.scroller),
            binders: Arc::downgrade(&self.binders),
            pins: Arc::downgrade(&self.pins),
            watcher: Arc::downgrade(&self.watcher),
            groups: Arc::downgrade(&self.groups),
            anchors: Arc::downgrade(&self.anchors),
        }
    }

    pub fn registry(&self) -> SharedTargetRegistry {
        Arc::clone(&self.registry)
    }

    // =========================================================================
    // Scroller surface
    // =========================================================================

    /// Update the scroller viewport; re-evaluates conditions and marks all
    /// trigger ranges for re-resolution (not just re-clamping)
    pub fn set_viewport(&self, viewport: Size) {
        let changed = self.scroller.lock().unwrap().set_viewport(viewport);
        if !changed {
            return;
        }
        self.needs_resolve.store(true, Ordering::SeqCst);
        self.watcher.lock().unwrap().set_viewport(viewport);
        self.evaluate_groups(viewport);
    }

    pub fn set_content_height(&self, height: f32) {
        self.scroller.lock().unwrap().set_content_height(height);
        self.needs_resolve.store(true, Ordering::SeqCst);
    }

    pub fn apply_scroll_delta(&self, delta: f32) {
        self.scroller.lock().unwrap().apply_scroll_delta(delta);
    }

    pub fn end_scroll_gesture(&self) {
        self.scroller.lock().unwrap().end_gesture();
    }

    pub fn offset(&self) -> f32 {
        self.scroller.lock().unwrap().offset()
    }

    pub fn viewport(&self) -> Size {
        self.scroller.lock().unwrap().viewport()
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Bind a trigger to a timeline
    ///
    /// Fails fast on invalid configuration (negative scrub, or a range that
    /// resolves degenerate right now). A target that does not exist yet, or
    /// an unsized scroller, defers resolution instead of failing.
    pub fn bind(&self, spec: TriggerSpec, timeline: Timeline) -> Result<BinderId, Error> {
        let viewport_height = self.scroller.lock().unwrap().viewport().height;
        {
            let registry = self.registry.lock().unwrap();
            if viewport_height > 0.0 {
                if let Some(bounds) = registry.bounds(spec.target) {
                    // Resolvable now: validate eagerly so a degenerate
                    // configuration is rejected, never silently parked
                    spec.resolve(bounds, viewport_height)?;
                }
            }
        }

        let mut binder = ScrollBinder::new(spec, timeline)?;
        binder.resolve(&self.registry.lock().unwrap(), viewport_height);
        Ok(self.binders.lock().unwrap().insert(binder))
    }

    /// Remove a binder, killing its timeline
    pub fn remove_binder(&self, id: BinderId) {
        if let Some(mut binder) = self.binders.lock().unwrap().remove(id) {
            binder.kill();
        }
    }

    pub fn binder_count(&self) -> usize {
        self.binders.lock().unwrap().len()
    }

    // =========================================================================
    // Pinning
    // =========================================================================

    /// Register a pin region
    ///
    /// At most one pin may cover any scroll offset per scroller; an
    /// immediately-resolvable overlap is rejected with `PinContention`.
    pub fn add_pin(
        &self,
        spec: TriggerSpec,
        timeline: Timeline,
        callbacks: PinCallbacks,
    ) -> Result<PinId, Error> {
        let (viewport_height, offset) = {
            let scroller = self.scroller.lock().unwrap();
            (scroller.viewport().height, scroller.offset())
        };

        let mut pin = PinController::new(spec, timeline, callbacks)?;
        {
            let registry = self.registry.lock().unwrap();
            pin.resolve(&registry, viewport_height, offset)?;
        }
        if let Some(range) = pin.range() {
            let pins = self.pins.lock().unwrap();
            for (_, other) in pins.iter() {
                if let Some(existing) = other.range() {
                    if range.start < existing.end && existing.start < range.end {
                        return Err(Error::PinContention);
                    }
                }
            }
        }
        Ok(self.pins.lock().unwrap().insert(pin))
    }

    pub fn remove_pin(&self, id: PinId) {
        if let Some(mut pin) = self.pins.lock().unwrap().remove(id) {
            pin.kill();
        }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.lock().unwrap().len()
    }

    pub fn pin_phase(&self, id: PinId) -> Option<crate::pin::PinPhase> {
        self.pins.lock().unwrap().get(id).and_then(|p| p.phase())
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// Register a raw predicate watch (most effects should use condition
    /// groups instead)
    pub fn register_watch(
        &self,
        predicate: &str,
        on_match: ConditionCallback,
        on_no_match: ConditionCallback,
    ) -> Result<WatchId, Error> {
        self.watcher
            .lock()
            .unwrap()
            .register(predicate, on_match, on_no_match)
    }

    pub fn dispose_watch(&self, id: WatchId) {
        self.watcher.lock().unwrap().dispose(id);
    }

    pub fn watch_count(&self) -> usize {
        self.watcher.lock().unwrap().watch_count()
    }

    /// Register a condition group and evaluate it immediately
    pub fn add_condition_group(&self, mut group: ConditionGroup) -> GroupId {
        let viewport = self.scroller.lock().unwrap().viewport();
        group.evaluate(viewport);
        let id = self.next_group_id.fetch_add(1, Ordering::SeqCst);
        self.groups.lock().unwrap().insert(id, group);
        id
    }

    /// Remove a group, disposing its live variant
    pub fn remove_condition_group(&self, id: GroupId) {
        if let Some(mut group) = self.groups.lock().unwrap().remove(&id) {
            group.dispose_all();
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    /// Evaluate every group, taking each out of the map while it runs so
    /// variant attach closures may register bindings through a handle
    fn evaluate_groups(&self, viewport: Size) {
        let ids: Vec<GroupId> = self.groups.lock().unwrap().keys().copied().collect();
        for id in ids {
            let group = self.groups.lock().unwrap().remove(&id);
            if let Some(mut group) = group {
                group.evaluate(viewport);
                self.groups.lock().unwrap().insert(id, group);
            }
        }
    }

    // =========================================================================
    // Anchors
    // =========================================================================

    /// Register a navigation anchor under a stable name
    pub fn register_anchor(&self, name: impl Into<String>, target: TargetId) {
        self.anchors.lock().unwrap().insert(name.into(), target);
    }

    pub fn remove_anchor(&self, name: &str) {
        self.anchors.lock().unwrap().remove(name);
    }

    /// Glide the scroller so the named anchor sits at the viewport top
    pub fn scroll_to_anchor(&self, name: &str) -> Result<(), Error> {
        let target = self
            .anchors
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownAnchor(name.to_string()))?;
        let bounds = self
            .registry
            .lock()
            .unwrap()
            .bounds(target)
            .ok_or_else(|| Error::UnknownAnchor(name.to_string()))?;
        self.scroller
            .lock()
            .unwrap()
            .glide_to(bounds.top(), ANCHOR_GLIDE_MS);
        Ok(())
    }

    // =========================================================================
    // Frame advance
    // =========================================================================

    /// Advance physics and drive every binding from one offset snapshot
    ///
    /// Returns true while any motion is still active.
    pub fn tick(&self, dt: f32) -> bool {
        let (snapshot, viewport_height, scroller_active) = {
            let mut scroller = self.scroller.lock().unwrap();
            let active = scroller.tick(dt);
            (scroller.offset(), scroller.viewport().height, active)
        };

        let mut registry = self.registry.lock().unwrap();

        // Bounds moved (resize, reflow, late image load): re-resolve every
        // trigger range from scratch
        let revision = registry.revision();
        let needs_resolve = self.needs_resolve.swap(false, Ordering::SeqCst)
            || self.resolved_revision.swap(revision, Ordering::SeqCst) != revision;

        {
            let mut pins = self.pins.lock().unwrap();
            for (_, pin) in pins.iter_mut() {
                if needs_resolve || !pin.is_resolved() {
                    if let Err(err) = pin.resolve(&registry, viewport_height, snapshot) {
                        tracing::warn!(%err, "pin range became degenerate, killing pin");
                        pin.kill();
                        continue;
                    }
                }
                pin.update(snapshot, dt, &mut registry);
            }
        }

        {
            let mut binders = self.binders.lock().unwrap();
            for (_, binder) in binders.iter_mut() {
                // Pending binders retry every frame; deactivated ones only
                // when bounds actually changed
                if needs_resolve || (binder.is_active() && !binder.is_resolved()) {
                    binder.resolve(&registry, viewport_height);
                }
                binder.update(snapshot, dt, &mut registry);
            }
        }

        scroller_active
    }
}

/// A weak handle to the engine; every operation no-ops once the engine is
/// dropped, so disposers held by long-lived bundles stay safe
#[derive(Clone)]
pub struct EngineHandle {
    registry: Weak<Mutex<TargetRegistry>>,
    scroller: Weak<Mutex<Scroller>>,
    binders: Weak<Mutex<SlotMap<BinderId, ScrollBinder>>>,
    pins: Weak<Mutex<SlotMap<PinId, PinController>>>,
    watcher: Weak<Mutex<ConditionWatcher>>,
    groups: Weak<Mutex<FxHashMap<GroupId, ConditionGroup>>>,
    anchors: Weak<Mutex<FxHashMap<String, TargetId>>>,
}

impl EngineHandle {
    pub fn is_alive(&self) -> bool {
        self.binders.strong_count() > 0
    }

    /// Bind a trigger to a timeline (deferred-only path: no eager
    /// degenerate check, the binder deactivates if resolution fails later)
    pub fn bind(&self, spec: TriggerSpec, timeline: Timeline) -> Option<BinderId> {
        let binders = self.binders.upgrade()?;
        let registry = self.registry.upgrade()?;
        let scroller = self.scroller.upgrade()?;

        let mut binder = ScrollBinder::new(spec, timeline).ok()?;
        let viewport_height = scroller.lock().unwrap().viewport().height;
        binder.resolve(&registry.lock().unwrap(), viewport_height);
        let id = binders.lock().unwrap().insert(binder);
        Some(id)
    }

    pub fn remove_binder(&self, id: BinderId) {
        if let Some(binders) = self.binders.upgrade() {
            if let Some(mut binder) = binders.lock().unwrap().remove(id) {
                binder.kill();
            }
        }
    }

    pub fn add_pin(
        &self,
        spec: TriggerSpec,
        timeline: Timeline,
        callbacks: PinCallbacks,
    ) -> Option<PinId> {
        let pins = self.pins.upgrade()?;
        let registry = self.registry.upgrade()?;
        let scroller = self.scroller.upgrade()?;

        let mut pin = PinController::new(spec, timeline, callbacks).ok()?;
        let (viewport_height, offset) = {
            let s = scroller.lock().unwrap();
            (s.viewport().height, s.offset())
        };
        pin.resolve(&registry.lock().unwrap(), viewport_height, offset)
            .ok()?;
        let id = pins.lock().unwrap().insert(pin);
        Some(id)
    }

    pub fn remove_pin(&self, id: PinId) {
        if let Some(pins) = self.pins.upgrade() {
            if let Some(mut pin) = pins.lock().unwrap().remove(id) {
                pin.kill();
            }
        }
    }

    pub fn dispose_watch(&self, id: WatchId) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.lock().unwrap().dispose(id);
        }
    }

    pub fn remove_condition_group(&self, id: GroupId) {
        if let Some(groups) = self.groups.upgrade() {
            if let Some(mut group) = groups.lock().unwrap().remove(&id) {
                group.dispose_all();
            }
        }
    }

    pub fn remove_anchor(&self, name: &str) {
        if let Some(anchors) = self.anchors.upgrade() {
            anchors.lock().unwrap().remove(name);
        }
    }

    /// Glide the scroller to an absolute offset
    pub fn glide_to(&self, offset: f32, duration_ms: f32) {
        if let Some(scroller) = self.scroller.upgrade() {
            scroller.lock().unwrap().glide_to(offset, duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinPhase;
    use crate::trigger::EdgeCondition;
    use revel_animation::{StyleState, Tween};
    use revel_core::Rect;

    fn engine_with_targets() -> (ScrollEngine, TargetId, TargetId) {
        let registry: SharedTargetRegistry = Arc::new(Mutex::new(TargetRegistry::new()));
        let (hero, offer) = {
            let mut reg = registry.lock().unwrap();
            (
                reg.register("hero", Rect::new(0.0, 0.0, 1280.0, 800.0)),
                reg.register("offer", Rect::new(0.0, 2000.0, 1280.0, 800.0)),
            )
        };
        let engine = ScrollEngine::new(registry, ScrollConfig::no_bounce());
        engine.set_viewport(Size::new(1280.0, 800.0));
        engine.set_content_height(5000.0);
        (engine, hero, offer)
    }

    fn fade_timeline(engine: &ScrollEngine, id: TargetId) -> Timeline {
        let mut tl = Timeline::new();
        tl.from_to(
            &mut engine.registry().lock().unwrap(),
            id,
            StyleState::new().opacity(0.0),
            StyleState::new().opacity(1.0),
            Tween::duration(1000.0),
        )
        .unwrap();
        tl
    }

    #[test]
    fn test_bind_rejects_degenerate_range() {
        let (engine, hero, _) = engine_with_targets();
        let spec = TriggerSpec::new(hero)
            .start(EdgeCondition::top_at(0.0))
            .end(EdgeCondition::top_at(0.75));
        let result = engine.bind(spec, Timeline::new());
        assert!(matches!(result, Err(Error::DegenerateRange { .. })));
        assert_eq!(engine.binder_count(), 0);
    }

    #[test]
    fn test_shared_snapshot_across_binders() {
        let (engine, _, offer) = engine_with_targets();

        // Two identical triggers on the same target must always agree
        let spec = || {
            TriggerSpec::new(offer)
                .start(EdgeCondition::top_at(1.0))
                .end(EdgeCondition::top_top())
        };
        let a = engine.bind(spec(), fade_timeline(&engine, offer)).unwrap();
        let b = engine.bind(spec(), fade_timeline(&engine, offer)).unwrap();

        engine.apply_scroll_delta(1600.0);
        engine.tick(1.0 / 60.0);

        let binders = engine.binders.lock().unwrap();
        assert_eq!(
            binders[a].displayed_progress(),
            binders[b].displayed_progress()
        );
    }

    #[test]
    fn test_deferred_bind_resolves_once_scroller_is_sized() {
        // Engine created before the host laid anything out
        let registry: SharedTargetRegistry = Arc::new(Mutex::new(TargetRegistry::new()));
        let offer = registry
            .lock()
            .unwrap()
            .register("offer", Rect::new(0.0, 2000.0, 1280.0, 800.0));
        let engine = ScrollEngine::new(registry, ScrollConfig::no_bounce());

        let spec = TriggerSpec::new(offer)
            .start(EdgeCondition::top_at(1.0))
            .end(EdgeCondition::top_top());
        // Unsized scroller: binding succeeds but stays pending
        let id = engine.bind(spec, Timeline::new()).unwrap();
        engine.tick(1.0 / 60.0);
        assert!(!engine.binders.lock().unwrap()[id].is_resolved());

        // Layout arrived
        engine.set_viewport(Size::new(1280.0, 800.0));
        engine.set_content_height(5000.0);
        engine.tick(1.0 / 60.0);
        assert!(engine.binders.lock().unwrap()[id].is_resolved());
    }

    #[test]
    fn test_pin_contention_rejected() {
        let (engine, hero, _) = engine_with_targets();

        let spec = TriggerSpec::new(hero)
            .start(EdgeCondition::top_top())
            .span_viewport(1.0);
        engine
            .add_pin(spec.clone(), Timeline::new(), PinCallbacks::new())
            .unwrap();

        let overlapping = engine.add_pin(spec, Timeline::new(), PinCallbacks::new());
        assert!(matches!(overlapping, Err(Error::PinContention)));
        assert_eq!(engine.pin_count(), 1);
    }

    #[test]
    fn test_pin_hand_off_flag() {
        use std::sync::atomic::AtomicBool;

        let (engine, hero, _) = engine_with_targets();
        let offer_active = Arc::new(AtomicBool::new(false));

        let set = Arc::clone(&offer_active);
        let clear = Arc::clone(&offer_active);
        let callbacks = PinCallbacks::new()
            .on_leave(move || set.store(true, Ordering::SeqCst))
            .on_enter_back(move || clear.store(false, Ordering::SeqCst));

        let spec = TriggerSpec::new(hero)
            .start(EdgeCondition::top_top())
            .span_viewport(1.0);
        let pin = engine.add_pin(spec, Timeline::new(), callbacks).unwrap();

        // Scroll through the pin range
        engine.apply_scroll_delta(1200.0);
        engine.tick(1.0 / 60.0);
        assert_eq!(engine.pin_phase(pin), Some(PinPhase::AfterRange));
        assert!(offer_active.load(Ordering::SeqCst));

        // Back up into the range
        engine.apply_scroll_delta(-600.0);
        engine.tick(1.0 / 60.0);
        assert_eq!(engine.pin_phase(pin), Some(PinPhase::Pinned));
        assert!(!offer_active.load(Ordering::SeqCst));
    }

    #[test]
    fn test_resize_reresolves_triggers() {
        let (engine, _, offer) = engine_with_targets();
        let spec = TriggerSpec::new(offer)
            .start(EdgeCondition::top_at(1.0))
            .end(EdgeCondition::top_top());
        let id = engine.bind(spec, fade_timeline(&engine, offer)).unwrap();
        engine.tick(1.0 / 60.0);
        let before = engine.binders.lock().unwrap()[id].range().unwrap();

        engine.set_viewport(Size::new(1280.0, 400.0));
        engine.tick(1.0 / 60.0);
        let after = engine.binders.lock().unwrap()[id].range().unwrap();
        assert!(after.start > before.start);
    }

    #[test]
    fn test_anchor_glide() {
        let (engine, _, offer) = engine_with_targets();
        engine.register_anchor("plans-section", offer);

        assert!(matches!(
            engine.scroll_to_anchor("nope"),
            Err(Error::UnknownAnchor(_))
        ));

        engine.scroll_to_anchor("plans-section").unwrap();
        for _ in 0..120 {
            if !engine.tick(1.0 / 60.0) {
                break;
            }
        }
        assert_eq!(engine.offset(), 2000.0);
    }

    #[test]
    fn test_handle_outlives_engine_safely() {
        let (engine, hero, _) = engine_with_targets();
        let handle = engine.handle();
        assert!(handle.is_alive());

        let spec = TriggerSpec::new(hero)
            .start(EdgeCondition::top_at(1.0))
            .end(EdgeCondition::top_top());
        let id = handle.bind(spec, Timeline::new()).unwrap();

        drop(engine);
        assert!(!handle.is_alive());
        // No panic on a dead engine
        handle.remove_binder(id);
    }
}
