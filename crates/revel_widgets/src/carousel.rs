//! Carousel state with optional autoplay
//!
//! The active index advances mod N with wraparound in both directions. An
//! autoplay timer registered on the scheduler advances the carousel on an
//! interval and pauses while the pointer hovers it.

use std::sync::{Arc, Mutex};

use revel_animation::{SchedulerHandle, TickerId};

/// Pure carousel index state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    active: usize,
    len: usize,
}

impl CarouselState {
    pub fn new(len: usize) -> Self {
        Self { active: 0, len }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.active = (self.active + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.active = (self.active + self.len - 1) % self.len;
        }
    }

    pub fn set_active(&mut self, index: usize) {
        if index < self.len {
            self.active = index;
        }
    }
}

/// Carousel with an autoplay timer
///
/// Dropping the carousel removes its ticker from the scheduler.
pub struct Carousel {
    state: Arc<Mutex<CarouselState>>,
    scheduler: SchedulerHandle,
    ticker: Option<TickerId>,
}

impl Carousel {
    pub fn new(len: usize, scheduler: SchedulerHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(CarouselState::new(len))),
            scheduler,
            ticker: None,
        }
    }

    /// Start advancing every `interval_ms` (e.g. 4500 for a slow deck)
    pub fn autoplay(mut self, interval_ms: f32) -> Self {
        let state = Arc::clone(&self.state);
        self.ticker = self.scheduler.add_ticker(
            interval_ms,
            Box::new(move || {
                state.lock().unwrap().next();
            }),
        );
        self
    }

    pub fn active(&self) -> usize {
        self.state.lock().unwrap().active()
    }

    pub fn next(&self) {
        self.state.lock().unwrap().next();
    }

    pub fn prev(&self) {
        self.state.lock().unwrap().prev();
    }

    /// Pointer entered the carousel: autoplay pauses
    pub fn pointer_enter(&self) {
        if let Some(id) = self.ticker {
            self.scheduler.pause_ticker(id);
        }
    }

    /// Pointer left: autoplay resumes with a fresh interval
    pub fn pointer_leave(&self) {
        if let Some(id) = self.ticker {
            self.scheduler.resume_ticker(id);
        }
    }

    /// Shared state handle for render-side sampling
    pub fn state(&self) -> Arc<Mutex<CarouselState>> {
        Arc::clone(&self.state)
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.scheduler.remove_ticker(id);
        }
    }
}
