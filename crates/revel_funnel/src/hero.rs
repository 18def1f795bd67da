//! Hero section: entrance sequence and the pinned hero-to-offer transition
//!
//! The page opens on a full-viewport hero. Scrolling pins the wrapper for
//! one viewport of travel while the hero zooms out and the offer zooms in;
//! leaving the range forward flips the "offer active" flag the offer
//! section consumes, and scrolling back flips it off again. Desktop and
//! mobile are two parameterizations of the same build, registered as
//! mutually exclusive variants.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use revel_animation::{Easing, Position, SchedulerHandle, StyleState, Timeline, Tween};
use revel_core::{Error, Rect, Size, TargetId};
use revel_scroll::{
    ConditionGroup, DisposerBundle, EdgeCondition, EngineHandle, MountCtx, PinCallbacks, Section,
    SharedTargetRegistry, TriggerSpec,
};

use crate::config::TransitionConfig;

/// Shared parameters for one hero-transition variant
#[derive(Debug, Clone, Copy)]
pub struct TransitionParams {
    /// Hero zoom at full progress
    pub hero_scale_to: f32,
    /// Peak blur on the outgoing hero, 0 disables the blur tracks
    pub hero_blur_px: f32,
    /// Offer scale at zero progress
    pub offer_scale_from: f32,
    /// Blur on the incoming offer at zero progress
    pub offer_blur_px: f32,
    pub scrub: f32,
    /// Whether the staggered entrance sequence plays
    pub entrance: bool,
}

impl TransitionParams {
    pub fn desktop(config: &TransitionConfig) -> Self {
        Self {
            hero_scale_to: config.desktop_hero_scale,
            hero_blur_px: config.desktop_hero_blur,
            offer_scale_from: 0.8,
            offer_blur_px: 4.0,
            scrub: config.desktop_scrub,
            entrance: true,
        }
    }

    /// No blur and a reduced zoom; entrance is skipped so content paints
    /// at rest immediately
    pub fn mobile(config: &TransitionConfig) -> Self {
        Self {
            hero_scale_to: config.mobile_hero_scale,
            hero_blur_px: 0.0,
            offer_scale_from: 0.9,
            offer_blur_px: 0.0,
            scrub: config.mobile_scrub,
            entrance: false,
        }
    }
}

/// Target names registered by the hero section
pub mod targets {
    pub const WRAPPER: &str = "hero-wrapper";
    pub const INTRO: &str = "hero-intro";
    pub const OFFER: &str = "hero-offer";
    pub const TOP_TEXT: &str = "hero-top-text";
    pub const LOGO: &str = "hero-logo";
    pub const HEADLINE: &str = "hero-headline";
    pub const NAME: &str = "hero-name";
    pub const INDICATOR: &str = "hero-indicator";
}

/// Build the cross-fade/zoom timeline scrubbed by the pin
fn build_transition(
    registry: &SharedTargetRegistry,
    intro: TargetId,
    offer: TargetId,
    params: TransitionParams,
) -> Result<Timeline, Error> {
    let mut reg = registry.lock().unwrap();
    let mut tl = Timeline::new();

    let mut intro_from = StyleState::new().opacity(1.0).scale(1.0);
    let mut intro_to = StyleState::new().opacity(0.0).scale(params.hero_scale_to);
    let mut offer_from = StyleState::new().opacity(0.0).scale(params.offer_scale_from);
    let mut offer_to = StyleState::new().opacity(1.0).scale(1.0);
    if params.hero_blur_px > 0.0 {
        intro_from = intro_from.blur(0.0);
        intro_to = intro_to.blur(params.hero_blur_px);
    }
    if params.offer_blur_px > 0.0 {
        offer_from = offer_from.blur(params.offer_blur_px);
        offer_to = offer_to.blur(0.0);
    }

    // Both halves run the full range, aligned at timeline start
    tl.from_to(
        &mut reg,
        intro,
        intro_from,
        intro_to,
        Tween::duration(1000.0)
            .position(Position::At(0.0))
            .align("hero-transition"),
    )?;
    tl.from_to(
        &mut reg,
        offer,
        offer_from,
        offer_to,
        Tween::duration(1000.0)
            .position(Position::WithPrevious)
            .align("hero-transition"),
    )?;
    Ok(tl)
}

/// Build the staggered desktop entrance
fn build_entrance(registry: &SharedTargetRegistry) -> Result<Timeline, Error> {
    let mut reg = registry.lock().unwrap();
    let lookup = |name: &str| {
        reg.lookup(name)
            .ok_or_else(|| Error::UnknownAnchor(name.to_string()))
    };
    let (top_text, logo, headline, name, indicator) = (
        lookup(targets::TOP_TEXT)?,
        lookup(targets::LOGO)?,
        lookup(targets::HEADLINE)?,
        lookup(targets::NAME)?,
        lookup(targets::INDICATOR)?,
    );

    let mut tl = Timeline::new();
    tl.from_to(
        &mut reg,
        top_text,
        StyleState::new().opacity(0.0).translate_y(-20.0),
        StyleState::new().opacity(1.0).translate_y(0.0),
        Tween::duration(800.0).ease(Easing::EaseOut),
    )?;
    tl.from_to(
        &mut reg,
        logo,
        StyleState::new()
            .clip_inset(0.5)
            .opacity(0.0)
            .scale(1.4)
            .hue_rotate(90.0),
        StyleState::new()
            .clip_inset(0.0)
            .opacity(1.0)
            .scale(1.0)
            .hue_rotate(0.0),
        Tween::duration(1200.0)
            .ease(Easing::EaseOut)
            .position(Position::RelativeToPrevious(-400.0)),
    )?;
    tl.from_to(
        &mut reg,
        headline,
        StyleState::new().opacity(0.0),
        StyleState::new().opacity(1.0),
        Tween::duration(100.0).position(Position::RelativeToPrevious(-800.0)),
    )?;
    tl.from_to(
        &mut reg,
        name,
        StyleState::new().opacity(0.0).scale(0.95),
        StyleState::new().opacity(1.0).scale(1.0),
        Tween::duration(800.0)
            .ease(Easing::EaseOut)
            .position(Position::RelativeToPrevious(-400.0)),
    )?;
    tl.from_to(
        &mut reg,
        indicator,
        StyleState::new().opacity(0.0),
        StyleState::new().opacity(1.0),
        Tween::duration(800.0)
            .ease(Easing::EaseOut)
            .position(Position::RelativeToPrevious(-200.0)),
    )?;
    tl.play();
    Ok(tl)
}

/// Looping pulse on the scroll indicator (both variants keep this)
fn build_pulse(registry: &SharedTargetRegistry) -> Result<Timeline, Error> {
    let mut reg = registry.lock().unwrap();
    let indicator = reg
        .lookup(targets::INDICATOR)
        .ok_or_else(|| Error::UnknownAnchor(targets::INDICATOR.to_string()))?;

    let mut tl = Timeline::new();
    tl.from_to(
        &mut reg,
        indicator,
        StyleState::new().translate_y(0.0),
        StyleState::new().translate_y(5.0),
        Tween::duration(1500.0).ease(Easing::QuadInOut),
    )?;
    tl.set_yoyo(true);
    tl.play();
    Ok(tl)
}

/// Attach one variant: entrance (optional), indicator pulse, and the pin
fn attach_variant(
    engine: &EngineHandle,
    scheduler: &SchedulerHandle,
    registry: &SharedTargetRegistry,
    offer_active: &Arc<AtomicBool>,
    params: TransitionParams,
) -> Result<DisposerBundle, Error> {
    let mut bundle = DisposerBundle::new();

    let (wrapper, intro, offer) = {
        let reg = registry.lock().unwrap();
        let lookup = |name: &str| {
            reg.lookup(name)
                .ok_or_else(|| Error::UnknownAnchor(name.to_string()))
        };
        (
            lookup(targets::WRAPPER)?,
            lookup(targets::INTRO)?,
            lookup(targets::OFFER)?,
        )
    };

    if params.entrance {
        let entrance = build_entrance(registry)?;
        if let Some(key) = scheduler.add_timeline(entrance) {
            let scheduler = scheduler.clone();
            bundle.push(move || scheduler.remove_timeline(key));
        }
    }

    let pulse = build_pulse(registry)?;
    if let Some(key) = scheduler.add_timeline(pulse) {
        let scheduler = scheduler.clone();
        bundle.push(move || scheduler.remove_timeline(key));
    }

    let transition = build_transition(registry, intro, offer, params)?;
    let set = Arc::clone(offer_active);
    let clear = Arc::clone(offer_active);
    let callbacks = PinCallbacks::new()
        .on_leave(move || set.store(true, Ordering::SeqCst))
        .on_enter_back(move || clear.store(false, Ordering::SeqCst));
    let spec = TriggerSpec::new(wrapper)
        .start(EdgeCondition::top_top())
        .span_viewport(1.0)
        .scrub(params.scrub);
    if let Some(pin) = engine.add_pin(spec, transition, callbacks) {
        let engine = engine.clone();
        bundle.push(move || engine.remove_pin(pin));
    }

    Ok(bundle)
}

/// Reposition the hero targets for a new viewport
pub fn relayout(registry: &SharedTargetRegistry, viewport: Size) {
    let mut reg = registry.lock().unwrap();
    let full = Rect::new(0.0, 0.0, viewport.width, viewport.height);
    let w = viewport.width;
    let slots = [
        (targets::WRAPPER, full),
        (targets::INTRO, full),
        (targets::OFFER, full),
        (
            targets::TOP_TEXT,
            Rect::new(0.0, viewport.height * 0.1, w, 30.0),
        ),
        (
            targets::LOGO,
            Rect::new(0.0, viewport.height * 0.25, w, 200.0),
        ),
        (
            targets::HEADLINE,
            Rect::new(0.0, viewport.height * 0.55, w, 40.0),
        ),
        (targets::NAME, Rect::new(0.0, viewport.height * 0.65, w, 24.0)),
        (
            targets::INDICATOR,
            Rect::new(0.0, viewport.height * 0.85, w, 60.0),
        ),
    ];
    for (name, bounds) in slots {
        if let Some(id) = reg.lookup(name) {
            reg.set_bounds(id, bounds);
        }
    }
}

/// The hero section
pub struct HeroSection {
    transition: TransitionConfig,
    breakpoint_px: f32,
    offer_active: Arc<AtomicBool>,
}

impl HeroSection {
    pub fn new(
        transition: TransitionConfig,
        breakpoint_px: f32,
        offer_active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transition,
            breakpoint_px,
            offer_active,
        }
    }

    /// Register the hero's render targets for the current viewport
    fn register_targets(&self, registry: &SharedTargetRegistry, viewport: Size) {
        let mut reg = registry.lock().unwrap();
        let full = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        reg.register(targets::WRAPPER, full);
        reg.register(targets::INTRO, full);
        reg.register(targets::OFFER, full);

        let w = viewport.width;
        reg.register(targets::TOP_TEXT, Rect::new(0.0, viewport.height * 0.1, w, 30.0));
        reg.register(targets::LOGO, Rect::new(0.0, viewport.height * 0.25, w, 200.0));
        reg.register(
            targets::HEADLINE,
            Rect::new(0.0, viewport.height * 0.55, w, 40.0),
        );
        reg.register(targets::NAME, Rect::new(0.0, viewport.height * 0.65, w, 24.0));
        reg.register(
            targets::INDICATOR,
            Rect::new(0.0, viewport.height * 0.85, w, 60.0),
        );
    }
}

impl Section for HeroSection {
    fn name(&self) -> &str {
        "hero"
    }

    fn mount(&mut self, ctx: &mut MountCtx<'_>) -> Result<DisposerBundle, Error> {
        let registry = ctx.engine.registry();
        self.register_targets(&registry, ctx.engine.viewport());

        let engine = ctx.engine.handle();
        let scheduler = ctx.scheduler.handle();
        let offer_active = Arc::clone(&self.offer_active);
        let transition = self.transition.clone();

        let desktop_predicate = format!("min-width: {}px", self.breakpoint_px);
        let mobile_predicate = format!("max-width: {}px", self.breakpoint_px - 1.0);

        let make_variant = move |params: TransitionParams| {
            let engine = engine.clone();
            let scheduler = scheduler.clone();
            let registry = Arc::clone(&registry);
            let offer_active = Arc::clone(&offer_active);
            move || match attach_variant(&engine, &scheduler, &registry, &offer_active, params) {
                Ok(bundle) => bundle,
                Err(err) => {
                    tracing::warn!(%err, "hero variant failed to attach");
                    DisposerBundle::new()
                }
            }
        };

        let group = ConditionGroup::new("hero-transition")
            .variant(
                "desktop",
                &desktop_predicate,
                Box::new(make_variant.clone()(TransitionParams::desktop(&transition))),
            )?
            .variant(
                "mobile",
                &mobile_predicate,
                Box::new(make_variant(TransitionParams::mobile(&transition))),
            )?;

        let group_id = ctx.engine.add_condition_group(group);

        let mut bundle = DisposerBundle::new();
        let engine = ctx.engine.handle();
        bundle.push(move || engine.remove_condition_group(group_id));

        let registry = ctx.engine.registry();
        bundle.push(move || {
            let mut reg = registry.lock().unwrap();
            for name in [
                targets::WRAPPER,
                targets::INTRO,
                targets::OFFER,
                targets::TOP_TEXT,
                targets::LOGO,
                targets::HEADLINE,
                targets::NAME,
                targets::INDICATOR,
            ] {
                if let Some(id) = reg.lookup(name) {
                    reg.remove(id);
                }
            }
        });
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revel_animation::Scheduler;
    use revel_core::TargetRegistry;
    use revel_scroll::{ScrollConfig, ScrollEngine};
    use std::sync::Mutex;

    fn harness(width: f32) -> (ScrollEngine, Scheduler, Arc<AtomicBool>) {
        let registry: SharedTargetRegistry = Arc::new(Mutex::new(TargetRegistry::new()));
        let engine = ScrollEngine::new(registry, ScrollConfig::no_bounce());
        engine.set_viewport(Size::new(width, 800.0));
        engine.set_content_height(8000.0);
        (engine, Scheduler::new(), Arc::new(AtomicBool::new(false)))
    }

    fn mount_hero(engine: &ScrollEngine, scheduler: &Scheduler, flag: &Arc<AtomicBool>) -> DisposerBundle {
        let mut section = HeroSection::new(TransitionConfig::default(), 768.0, Arc::clone(flag));
        let mut ctx = MountCtx::new(engine, scheduler);
        section.mount(&mut ctx).unwrap()
    }

    #[test]
    fn test_desktop_mount_attaches_pin_and_entrance() {
        let (engine, scheduler, flag) = harness(1280.0);
        let _bundle = mount_hero(&engine, &scheduler, &flag);

        assert_eq!(engine.pin_count(), 1);
        // Entrance + pulse timelines
        assert_eq!(scheduler.timeline_count(), 2);
    }

    #[test]
    fn test_mobile_mount_skips_entrance() {
        let (engine, scheduler, flag) = harness(390.0);
        let _bundle = mount_hero(&engine, &scheduler, &flag);

        assert_eq!(engine.pin_count(), 1);
        // Pulse only
        assert_eq!(scheduler.timeline_count(), 1);
    }

    #[test]
    fn test_hand_off_flag_flips_both_ways() {
        let (engine, scheduler, flag) = harness(1280.0);
        let _bundle = mount_hero(&engine, &scheduler, &flag);

        // Scroll through the pinned viewport
        engine.apply_scroll_delta(1200.0);
        engine.tick(1.0 / 60.0);
        assert!(flag.load(Ordering::SeqCst));

        engine.apply_scroll_delta(-600.0);
        engine.tick(1.0 / 60.0);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_transition_drives_cross_fade() {
        let (engine, scheduler, flag) = harness(1280.0);
        let _bundle = mount_hero(&engine, &scheduler, &flag);

        let registry = engine.registry();
        let (intro, offer) = {
            let reg = registry.lock().unwrap();
            (
                reg.lookup(targets::INTRO).unwrap(),
                reg.lookup(targets::OFFER).unwrap(),
            )
        };

        // Offer starts hidden (from-state applied at build)
        assert_eq!(registry.lock().unwrap().style(offer).unwrap().opacity, 0.0);

        // Scrub to the middle of the pinned range and let the lagging
        // progress converge
        engine.apply_scroll_delta(400.0);
        for _ in 0..600 {
            engine.tick(1.0 / 60.0);
        }

        let reg = registry.lock().unwrap();
        let intro_style = reg.style(intro).unwrap();
        let offer_style = reg.style(offer).unwrap();
        assert!(intro_style.opacity < 0.6, "intro fading: {}", intro_style.opacity);
        assert!(offer_style.opacity > 0.4, "offer appearing: {}", offer_style.opacity);
        assert!(intro_style.scale > 1.0);
        assert!(offer_style.scale < 1.0);
    }

    #[test]
    fn test_variant_flip_tears_down_previous() {
        let (engine, scheduler, flag) = harness(1280.0);
        let _bundle = mount_hero(&engine, &scheduler, &flag);
        assert_eq!(scheduler.timeline_count(), 2);

        // Shrink below the breakpoint: desktop bindings fully torn down,
        // mobile attached
        engine.set_viewport(Size::new(390.0, 800.0));
        assert_eq!(engine.pin_count(), 1);
        assert_eq!(scheduler.timeline_count(), 1);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let (engine, scheduler, flag) = harness(1280.0);
        let mut bundle = mount_hero(&engine, &scheduler, &flag);

        bundle.dispose();
        assert_eq!(engine.pin_count(), 0);
        assert_eq!(scheduler.timeline_count(), 0);
        assert_eq!(engine.group_count(), 0);
        assert!(engine
            .registry()
            .lock()
            .unwrap()
            .lookup(targets::WRAPPER)
            .is_none());

        // Second dispose is a no-op
        bundle.dispose();
    }
}
