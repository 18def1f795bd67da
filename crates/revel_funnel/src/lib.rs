//! Revel Funnel
//!
//! The long-form landing page assembled on the Revel stack: a pinned
//! hero-to-offer transition, per-section scroll reveals under one shared
//! scroller, the navigation anchor for the "scroll to offer" action, and
//! the page's interaction widgets (accordions, testimonial carousel,
//! before/after slider, certificate typewriter, guests marquee).
//!
//! The host render layer drives the funnel with input events and one
//! [`Funnel::frame`] call per animation frame, then paints from the
//! shared target registry. Content (copy, images, item counts) is the
//! host's concern and arrives through [`FunnelContent`].
//!
//! ```rust
//! use revel_core::Size;
//! use revel_funnel::{Funnel, FunnelConfig, FunnelContent};
//!
//! let mut funnel = Funnel::new(
//!     FunnelConfig::default(),
//!     FunnelContent::default(),
//!     Size::new(1280.0, 800.0),
//! );
//! funnel.mount();
//!
//! // Per frame: apply input, advance, paint from the registry
//! funnel.scroll(24.0);
//! funnel.frame(1.0 / 60.0);
//! ```

pub mod config;
pub mod hero;
pub mod reveal;

pub use config::{FunnelConfig, RevealConfig, TransitionConfig, WidgetsConfig};
pub use hero::{HeroSection, TransitionParams};
pub use reveal::{RevealParams, RevealSection};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use revel_animation::Scheduler;
use revel_core::{Error, Size, TargetRegistry};
use revel_scroll::{
    MountCtx, ScrollConfig, ScrollEngine, SectionSet, SharedTargetRegistry,
};
use revel_widgets::{Accordion, Carousel, CompareSlider, Marquee, Typewriter, TypewriterConfig};

/// Install the process-wide tracing subscriber (host applications call
/// this once; respects `RUST_LOG`)
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Content supplied by the host; everything here is data, not behavior
#[derive(Debug, Clone)]
pub struct FunnelContent {
    /// Names cycled by the certificate typewriter
    pub certificate_names: Vec<String>,
    pub module_count: usize,
    pub faq_count: usize,
    pub testimonial_count: usize,
    /// Width of one repetition of the guests marquee row
    pub guest_row_width: f32,
}

impl Default for FunnelContent {
    fn default() -> Self {
        Self {
            certificate_names: vec!["{STUDENT_NAME}".to_string()],
            module_count: 8,
            faq_count: 6,
            testimonial_count: 7,
            guest_row_width: 1800.0,
        }
    }
}

/// The page's interaction widgets
pub struct Widgets {
    pub modules: Arc<Mutex<Accordion>>,
    pub faq: Arc<Mutex<Accordion>>,
    pub testimonials: Carousel,
    pub compare: Arc<Mutex<CompareSlider>>,
    pub typewriter: Arc<Mutex<Typewriter>>,
    pub marquee: Arc<Mutex<Marquee>>,
}

/// Reveal sections below the pinned hero, in page order
const REVEAL_SECTIONS: [&str; 9] = [
    "pain-points",
    "method",
    "guests",
    "certificate",
    "portfolio",
    "modules",
    "plans",
    "faq",
    "footer",
];

const PLANS_INDEX: usize = 6;
const PORTFOLIO_INDEX: usize = 4;

/// Page flow: hero viewport + pinned span + one viewport per section
fn content_height(viewport: Size) -> f32 {
    viewport.height * (2.0 + REVEAL_SECTIONS.len() as f32)
}

/// The assembled funnel page
pub struct Funnel {
    engine: ScrollEngine,
    scheduler: Scheduler,
    sections: SectionSet,
    offer_active: Arc<AtomicBool>,
    pub widgets: Widgets,
}

impl Funnel {
    pub fn new(config: FunnelConfig, content: FunnelContent, viewport: Size) -> Self {
        let registry: SharedTargetRegistry = Arc::new(Mutex::new(TargetRegistry::new()));
        let engine = ScrollEngine::new(registry, ScrollConfig::default());
        engine.set_viewport(viewport);
        engine.set_content_height(content_height(viewport));

        let scheduler = Scheduler::new();
        let offer_active = Arc::new(AtomicBool::new(false));

        let widgets = Widgets {
            modules: Arc::new(Mutex::new(Accordion::new(content.module_count))),
            faq: Arc::new(Mutex::new(Accordion::new(content.faq_count))),
            testimonials: Carousel::new(content.testimonial_count, scheduler.handle())
                .autoplay(config.widgets.autoplay_interval_ms),
            compare: Arc::new(Mutex::new(CompareSlider::new(RevealSection::bounds(
                PORTFOLIO_INDEX,
                viewport,
            )))),
            typewriter: Arc::new(Mutex::new(Typewriter::new(
                content.certificate_names.clone(),
                TypewriterConfig {
                    type_ms: config.widgets.typewriter_type_ms,
                    delete_ms: config.widgets.typewriter_delete_ms,
                    hold_ms: config.widgets.typewriter_hold_ms,
                },
            ))),
            marquee: Arc::new(Mutex::new(Marquee::new(
                content.guest_row_width,
                config.widgets.marquee_speed,
            ))),
        };

        let mut sections = SectionSet::new();
        sections.add(HeroSection::new(
            config.transition.clone(),
            config.breakpoint_px,
            Arc::clone(&offer_active),
        ));
        for (index, name) in REVEAL_SECTIONS.iter().enumerate() {
            let section =
                RevealSection::new(*name, index, config.reveal.clone(), config.breakpoint_px);
            let section = if index == PLANS_INDEX {
                section.with_anchor()
            } else {
                section
            };
            sections.add(section);
        }

        Self {
            engine,
            scheduler,
            sections,
            offer_active,
            widgets,
        }
    }

    /// Mount every section; returns the number mounted
    pub fn mount(&mut self) -> usize {
        let mut ctx = MountCtx::new(&self.engine, &self.scheduler);
        self.sections.mount_all(&mut ctx)
    }

    /// Unmount everything, disposing all registrations
    pub fn unmount(&mut self) {
        self.sections.unmount_all();
    }

    /// Advance one animation frame; `dt` in seconds
    ///
    /// Returns true while any motion is still active.
    pub fn frame(&mut self, dt: f32) -> bool {
        let scrolling = self.engine.tick(dt);

        let registry = self.engine.registry();
        let timed = {
            let mut reg = registry.lock().unwrap();
            self.scheduler.tick(dt * 1000.0, &mut reg)
        };

        self.widgets.typewriter.lock().unwrap().tick(dt * 1000.0);
        self.widgets.marquee.lock().unwrap().tick(dt);

        scrolling || timed
    }

    // =========================================================================
    // Host input
    // =========================================================================

    pub fn scroll(&self, delta: f32) {
        self.engine.apply_scroll_delta(delta);
    }

    pub fn end_scroll_gesture(&self) {
        self.engine.end_scroll_gesture();
    }

    /// Viewport changed: conditions re-evaluate, trigger ranges
    /// re-resolve, and section targets reflow
    pub fn handle_viewport(&self, viewport: Size) {
        self.engine.set_viewport(viewport);
        self.engine.set_content_height(content_height(viewport));

        let registry = self.engine.registry();
        hero::relayout(&registry, viewport);
        {
            let mut reg = registry.lock().unwrap();
            for (index, name) in REVEAL_SECTIONS.iter().enumerate() {
                if let Some(id) = reg.lookup(name) {
                    reg.set_bounds(id, RevealSection::bounds(index, viewport));
                }
            }
        }
        self.widgets
            .compare
            .lock()
            .unwrap()
            .set_bounds(RevealSection::bounds(PORTFOLIO_INDEX, viewport));
    }

    /// The "scroll to offer" action: glide to the plans section
    pub fn scroll_to_plans(&self) -> Result<(), Error> {
        self.engine.scroll_to_anchor("plans-section")
    }

    // =========================================================================
    // State queries
    // =========================================================================

    /// The pin hand-off flag the offer section consumes
    pub fn offer_active(&self) -> bool {
        self.offer_active.load(Ordering::SeqCst)
    }

    pub fn engine(&self) -> &ScrollEngine {
        &self.engine
    }

    pub fn registry(&self) -> SharedTargetRegistry {
        self.engine.registry()
    }

    pub fn offset(&self) -> f32 {
        self.engine.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revel_core::Rect;

    fn desktop_funnel() -> Funnel {
        let mut funnel = Funnel::new(
            FunnelConfig::default(),
            FunnelContent::default(),
            Size::new(1280.0, 800.0),
        );
        assert_eq!(funnel.mount(), 10);
        funnel
    }

    #[test]
    fn test_mount_registers_all_bindings() {
        let funnel = desktop_funnel();

        // One pin (hero), one binder per reveal section
        assert_eq!(funnel.engine.pin_count(), 1);
        assert_eq!(funnel.engine.binder_count(), REVEAL_SECTIONS.len());
        // One condition group per section
        assert_eq!(funnel.engine.group_count(), 1 + REVEAL_SECTIONS.len());
    }

    #[test]
    fn test_scroll_journey_flips_offer_flag() {
        let mut funnel = desktop_funnel();
        assert!(!funnel.offer_active());

        // Scroll through the pinned hero span
        funnel.scroll(1200.0);
        funnel.frame(1.0 / 60.0);
        assert!(funnel.offer_active());

        // Back up into the transition
        funnel.scroll(-800.0);
        funnel.frame(1.0 / 60.0);
        assert!(!funnel.offer_active());
    }

    #[test]
    fn test_frame_advances_widgets() {
        let mut funnel = desktop_funnel();
        let start_marquee = funnel.widgets.marquee.lock().unwrap().offset();

        // ~5 simulated seconds
        for _ in 0..300 {
            funnel.frame(1.0 / 60.0);
        }

        assert_ne!(funnel.widgets.marquee.lock().unwrap().offset(), start_marquee);
        // Autoplay (4500ms) advanced the testimonial deck once
        assert_eq!(funnel.widgets.testimonials.active(), 1);
    }

    #[test]
    fn test_scroll_to_plans_glides() {
        let mut funnel = desktop_funnel();
        funnel.scroll_to_plans().unwrap();

        for _ in 0..180 {
            if !funnel.frame(1.0 / 60.0) {
                break;
            }
        }
        // Plans slot: (2 + 6) * 800
        assert_eq!(funnel.offset(), 6400.0);
    }

    #[test]
    fn test_unmount_leaves_no_registrations() {
        let mut funnel = desktop_funnel();
        funnel.unmount();

        assert_eq!(funnel.engine.pin_count(), 0);
        assert_eq!(funnel.engine.binder_count(), 0);
        assert_eq!(funnel.engine.group_count(), 0);
        assert_eq!(funnel.engine.watch_count(), 0);
        assert!(funnel.registry().lock().unwrap().is_empty());

        // Unmounting twice is harmless
        funnel.unmount();
    }

    #[test]
    fn test_viewport_flip_to_mobile_swaps_variants() {
        let funnel = desktop_funnel();

        funnel.handle_viewport(Size::new(390.0, 844.0));
        // Still exactly one pin and one binder per section
        assert_eq!(funnel.engine.pin_count(), 1);
        assert_eq!(funnel.engine.binder_count(), REVEAL_SECTIONS.len());
    }

    #[test]
    fn test_accordion_single_open_via_widgets() {
        let funnel = desktop_funnel();
        let faq = &funnel.widgets.faq;

        faq.lock().unwrap().toggle(3);
        faq.lock().unwrap().toggle(5);
        assert_eq!(faq.lock().unwrap().open_index(), Some(5));
    }

    #[test]
    fn test_resting_state_visible_without_animation() {
        // A funnel that never mounts its animation layer still renders
        // everything at rest
        let funnel = Funnel::new(
            FunnelConfig::default(),
            FunnelContent::default(),
            Size::new(1280.0, 800.0),
        );
        let registry = funnel.registry();
        let mut reg = registry.lock().unwrap();
        let id = reg.register("late-section", Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(reg.style(id).unwrap().opacity, 1.0);
        assert_eq!(reg.style(id).unwrap().scale, 1.0);
    }
}
