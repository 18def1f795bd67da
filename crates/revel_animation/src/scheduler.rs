//! Frame scheduler
//!
//! Owns free-running timelines (entrance sequences, pulses, marquees) and
//! recurring tick callbacks (carousel autoplay, typewriters), advancing
//! them once per host frame. Everything runs on the caller's thread; there
//! is no background ticking, the host's frame loop is the clock.
//!
//! Components hold a [`SchedulerHandle`] (a weak reference), so a dropped
//! scheduler turns their calls into no-ops instead of keeping animation
//! state alive.

use std::sync::{Arc, Mutex, Weak};

use slotmap::{new_key_type, SlotMap};

use revel_core::TargetRegistry;

use crate::timeline::Timeline;

new_key_type! {
    /// Handle to a scheduler-owned timeline
    pub struct TimelineKey;
    /// Handle to a recurring tick callback
    pub struct TickerId;
}

/// Callback fired when a ticker's interval elapses
pub type TickCallback = Box<dyn FnMut() + Send>;

struct Ticker {
    interval_ms: f32,
    elapsed_ms: f32,
    paused: bool,
    /// Taken out while firing so callbacks may re-enter the scheduler
    callback: Option<TickCallback>,
}

#[derive(Default)]
struct SchedulerInner {
    timelines: SlotMap<TimelineKey, Timeline>,
    tickers: SlotMap<TickerId, Ticker>,
}

/// The frame scheduler
pub struct Scheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner::default())),
        }
    }

    /// Weak handle for components that register animations
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn add_timeline(&self, timeline: Timeline) -> TimelineKey {
        self.inner.lock().unwrap().timelines.insert(timeline)
    }

    /// Mutate a scheduler-owned timeline in place
    pub fn with_timeline<F, R>(&self, key: TimelineKey, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        self.inner.lock().unwrap().timelines.get_mut(key).map(f)
    }

    pub fn remove_timeline(&self, key: TimelineKey) {
        self.inner.lock().unwrap().timelines.remove(key);
    }

    /// Register a callback fired every `interval_ms`
    pub fn add_ticker(&self, interval_ms: f32, callback: TickCallback) -> TickerId {
        self.inner.lock().unwrap().tickers.insert(Ticker {
            interval_ms: interval_ms.max(1.0),
            elapsed_ms: 0.0,
            paused: false,
            callback: Some(callback),
        })
    }

    pub fn pause_ticker(&self, id: TickerId) {
        if let Some(t) = self.inner.lock().unwrap().tickers.get_mut(id) {
            t.paused = true;
        }
    }

    /// Resume a paused ticker; the accumulated interval restarts
    pub fn resume_ticker(&self, id: TickerId) {
        if let Some(t) = self.inner.lock().unwrap().tickers.get_mut(id) {
            t.paused = false;
            t.elapsed_ms = 0.0;
        }
    }

    /// Remove a ticker; safe to call with a stale id
    pub fn remove_ticker(&self, id: TickerId) {
        self.inner.lock().unwrap().tickers.remove(id);
    }

    pub fn timeline_count(&self) -> usize {
        self.inner.lock().unwrap().timelines.len()
    }

    pub fn ticker_count(&self) -> usize {
        self.inner.lock().unwrap().tickers.len()
    }

    /// Advance all timelines and fire due tickers
    ///
    /// Returns true while anything is still active. Ticker callbacks are
    /// invoked outside the ticker's own slot, so they may register or
    /// remove scheduler entries.
    pub fn tick(&self, dt_ms: f32, registry: &mut TargetRegistry) -> bool {
        let mut due: Vec<(TickerId, u32)> = Vec::new();
        {
            let mut inner = self.inner.lock().unwrap();

            for (_, timeline) in inner.timelines.iter_mut() {
                timeline.tick(dt_ms, registry);
            }

            for (id, ticker) in inner.tickers.iter_mut() {
                if ticker.paused {
                    continue;
                }
                ticker.elapsed_ms += dt_ms;
                let mut fires = 0u32;
                while ticker.elapsed_ms >= ticker.interval_ms {
                    ticker.elapsed_ms -= ticker.interval_ms;
                    fires += 1;
                }
                if fires > 0 {
                    due.push((id, fires));
                }
            }
        }

        for (id, fires) in due {
            let callback = self.inner.lock().unwrap().tickers.get_mut(id).and_then(|t| t.callback.take());
            if let Some(mut callback) = callback {
                for _ in 0..fires {
                    callback();
                }
                // The callback may have removed its own ticker
                if let Some(t) = self.inner.lock().unwrap().tickers.get_mut(id) {
                    t.callback = Some(callback);
                }
            }
        }

        let inner = self.inner.lock().unwrap();
        inner.timelines.iter().any(|(_, t)| t.is_playing())
            || inner.tickers.iter().any(|(_, t)| !t.paused)
    }
}

/// A weak handle to the scheduler
///
/// All operations no-op once the scheduler is dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    pub fn add_ticker(&self, interval_ms: f32, callback: TickCallback) -> Option<TickerId> {
        self.inner.upgrade().map(|inner| {
            inner.lock().unwrap().tickers.insert(Ticker {
                interval_ms: interval_ms.max(1.0),
                elapsed_ms: 0.0,
                paused: false,
                callback: Some(callback),
            })
        })
    }

    pub fn pause_ticker(&self, id: TickerId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(t) = inner.lock().unwrap().tickers.get_mut(id) {
                t.paused = true;
            }
        }
    }

    pub fn resume_ticker(&self, id: TickerId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(t) = inner.lock().unwrap().tickers.get_mut(id) {
                t.paused = false;
                t.elapsed_ms = 0.0;
            }
        }
    }

    pub fn remove_ticker(&self, id: TickerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().tickers.remove(id);
        }
    }

    pub fn add_timeline(&self, timeline: Timeline) -> Option<TimelineKey> {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().timelines.insert(timeline))
    }

    pub fn with_timeline<F, R>(&self, key: TimelineKey, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().timelines.get_mut(key).map(f))
    }

    pub fn remove_timeline(&self, key: TimelineKey) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().timelines.remove(key);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{StyleState, Tween};
    use revel_core::Rect;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_ticker_fires_on_interval() {
        let scheduler = Scheduler::new();
        let mut registry = TargetRegistry::new();

        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        scheduler.add_ticker(100.0, Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        // 250ms elapsed in 16ms steps fires twice
        for _ in 0..16 {
            scheduler.tick(16.0, &mut registry);
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_paused_ticker_does_not_fire() {
        let scheduler = Scheduler::new();
        let mut registry = TargetRegistry::new();

        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let id = scheduler.add_ticker(50.0, Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        scheduler.pause_ticker(id);
        for _ in 0..10 {
            scheduler.tick(16.0, &mut registry);
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        scheduler.resume_ticker(id);
        for _ in 0..10 {
            scheduler.tick(16.0, &mut registry);
        }
        assert!(count.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_scheduler_ticks_timelines() {
        let scheduler = Scheduler::new();
        let mut registry = TargetRegistry::new();
        let id = registry.register("a", Rect::new(0.0, 0.0, 10.0, 10.0));

        let mut tl = Timeline::new();
        tl.from_to(
            &mut registry,
            id,
            StyleState::new().opacity(0.0),
            StyleState::new().opacity(1.0),
            Tween::duration(100.0),
        )
        .unwrap();
        tl.play();
        let key = scheduler.add_timeline(tl);

        for _ in 0..10 {
            scheduler.tick(16.0, &mut registry);
        }
        assert_eq!(registry.style(id).unwrap().opacity, 1.0);
        assert!(!scheduler.with_timeline(key, |t| t.is_playing()).unwrap());
    }

    #[test]
    fn test_dead_handle_no_ops() {
        let handle = {
            let scheduler = Scheduler::new();
            scheduler.handle()
        };
        assert!(!handle.is_alive());
        assert!(handle.add_ticker(100.0, Box::new(|| {})).is_none());
    }

    #[test]
    fn test_ticker_callback_can_remove_itself() {
        let scheduler = Scheduler::new();
        let mut registry = TargetRegistry::new();

        let handle = scheduler.handle();
        let slot: Arc<Mutex<Option<TickerId>>> = Arc::new(Mutex::new(None));
        let slot_inner = Arc::clone(&slot);
        let id = scheduler.add_ticker(10.0, Box::new(move || {
            if let Some(id) = *slot_inner.lock().unwrap() {
                handle.remove_ticker(id);
            }
        }));
        *slot.lock().unwrap() = Some(id);

        scheduler.tick(20.0, &mut registry);
        assert_eq!(scheduler.ticker_count(), 0);
    }
}
