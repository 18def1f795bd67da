//! Scroll reveals
//!
//! Every content section below the hero fades and slides in as it scrolls
//! into view. One parameterized implementation serves both layout
//! variants; desktop adds distance and blur, mobile keeps the cheap
//! opacity/translate pair. The plans section additionally registers the
//! navigation anchor the "scroll to offer" action targets.

use std::sync::Arc;

use revel_animation::{Easing, StyleState, Timeline, Tween};
use revel_core::{Error, Rect, Size, TargetId};
use revel_scroll::{
    ConditionGroup, DisposerBundle, EdgeCondition, EngineHandle, MountCtx, Section,
    SharedTargetRegistry, TriggerSpec,
};

use crate::config::RevealConfig;

/// Parameters for one reveal variant
#[derive(Debug, Clone, Copy)]
pub struct RevealParams {
    pub distance_px: f32,
    /// 0 disables the blur track
    pub blur_px: f32,
    /// Viewport fraction where the reveal starts
    pub start_fraction: f32,
    /// Viewport fraction where the reveal completes
    pub end_fraction: f32,
    pub duration_ms: f32,
}

impl RevealParams {
    pub fn desktop(config: &RevealConfig) -> Self {
        Self {
            distance_px: config.distance_px,
            blur_px: 6.0,
            start_fraction: config.start_fraction,
            end_fraction: config.start_fraction - 0.35,
            duration_ms: config.duration_ms,
        }
    }

    pub fn mobile(config: &RevealConfig) -> Self {
        Self {
            distance_px: config.distance_px * 0.6,
            blur_px: 0.0,
            start_fraction: config.start_fraction,
            end_fraction: config.start_fraction - 0.35,
            duration_ms: config.duration_ms,
        }
    }
}

/// Bind a reveal timeline for `target`, returning its disposer
pub fn bind_reveal(
    engine: &EngineHandle,
    registry: &SharedTargetRegistry,
    target: TargetId,
    params: RevealParams,
) -> Result<DisposerBundle, Error> {
    let mut timeline = Timeline::new();
    {
        let mut reg = registry.lock().unwrap();
        let mut from = StyleState::new().opacity(0.0).translate_y(params.distance_px);
        let mut to = StyleState::new().opacity(1.0).translate_y(0.0);
        if params.blur_px > 0.0 {
            from = from.blur(params.blur_px);
            to = to.blur(0.0);
        }
        timeline.from_to(
            &mut reg,
            target,
            from,
            to,
            Tween::duration(params.duration_ms).ease(Easing::EaseOut),
        )?;
    }

    let spec = TriggerSpec::new(target)
        .start(EdgeCondition::top_at(params.start_fraction))
        .end(EdgeCondition::top_at(params.end_fraction));

    let mut bundle = DisposerBundle::new();
    if let Some(id) = engine.bind(spec, timeline) {
        let engine = engine.clone();
        bundle.push(move || engine.remove_binder(id));
    }
    Ok(bundle)
}

/// A content section revealed on scroll
pub struct RevealSection {
    name: String,
    /// Position in the page flow, after the pinned hero
    index: usize,
    config: RevealConfig,
    breakpoint_px: f32,
    /// Register this section as the "plans-section" navigation anchor
    anchor: bool,
}

impl RevealSection {
    pub fn new(name: impl Into<String>, index: usize, config: RevealConfig, breakpoint_px: f32) -> Self {
        Self {
            name: name.into(),
            index,
            config,
            breakpoint_px,
            anchor: false,
        }
    }

    /// Make this section addressable by the scroll-to-offer action
    pub fn with_anchor(mut self) -> Self {
        self.anchor = true;
        self
    }

    /// Content-flow bounds: sections stack one viewport tall below the
    /// hero and its pinned span
    pub fn bounds(index: usize, viewport: Size) -> Rect {
        let y = viewport.height * (2.0 + index as f32);
        Rect::new(0.0, y, viewport.width, viewport.height)
    }
}

impl Section for RevealSection {
    fn name(&self) -> &str {
        &self.name
    }

    fn mount(&mut self, ctx: &mut MountCtx<'_>) -> Result<DisposerBundle, Error> {
        let registry = ctx.engine.registry();
        let viewport = ctx.engine.viewport();
        let target = registry
            .lock()
            .unwrap()
            .register(self.name.clone(), Self::bounds(self.index, viewport));

        let desktop_predicate = format!("min-width: {}px", self.breakpoint_px);
        let mobile_predicate = format!("max-width: {}px", self.breakpoint_px - 1.0);

        let engine = ctx.engine.handle();
        let make_variant = move |params: RevealParams| {
            let engine = engine.clone();
            let registry = Arc::clone(&registry);
            move || match bind_reveal(&engine, &registry, target, params) {
                Ok(bundle) => bundle,
                Err(err) => {
                    tracing::warn!(%err, "reveal failed to bind");
                    DisposerBundle::new()
                }
            }
        };

        let group = ConditionGroup::new(format!("reveal:{}", self.name))
            .variant(
                "desktop",
                &desktop_predicate,
                Box::new(make_variant.clone()(RevealParams::desktop(&self.config))),
            )?
            .variant(
                "mobile",
                &mobile_predicate,
                Box::new(make_variant(RevealParams::mobile(&self.config))),
            )?;
        let group_id = ctx.engine.add_condition_group(group);

        let mut bundle = DisposerBundle::new();
        let engine = ctx.engine.handle();
        bundle.push(move || engine.remove_condition_group(group_id));

        if self.anchor {
            ctx.engine.register_anchor("plans-section", target);
            let engine = ctx.engine.handle();
            bundle.push(move || engine.remove_anchor("plans-section"));
        }

        let registry = ctx.engine.registry();
        bundle.push(move || {
            registry.lock().unwrap().remove(target);
        });
        Ok(bundle)
    }
}
