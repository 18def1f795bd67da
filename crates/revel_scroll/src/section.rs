//! Section composition
//!
//! A page is an ordered list of sections, each independently registering
//! its own triggers, timelines, watchers, and timers against the shared
//! engine. Mounting returns a disposer bundle; unmount invokes it exactly
//! once. One section failing to mount must never prevent its siblings from
//! mounting (fault isolation per section).

use indexmap::IndexMap;

use revel_animation::Scheduler;
use revel_core::Error;

use crate::dispose::DisposerBundle;
use crate::engine::ScrollEngine;

/// Everything a section needs while mounting
pub struct MountCtx<'a> {
    pub engine: &'a ScrollEngine,
    pub scheduler: &'a Scheduler,
}

impl<'a> MountCtx<'a> {
    pub fn new(engine: &'a ScrollEngine, scheduler: &'a Scheduler) -> Self {
        Self { engine, scheduler }
    }
}

/// One content block of the page
pub trait Section: Send {
    fn name(&self) -> &str;

    /// Register this section's bindings, returning their disposers
    fn mount(&mut self, ctx: &mut MountCtx<'_>) -> Result<DisposerBundle, Error>;
}

struct SectionSlot {
    section: Box<dyn Section>,
    bundle: Option<DisposerBundle>,
}

/// Ordered set of sections sharing one scroller
#[derive(Default)]
pub struct SectionSet {
    sections: IndexMap<String, SectionSlot>,
}

impl SectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section; order of insertion is the page order
    pub fn add(&mut self, section: impl Section + 'static) {
        self.sections.insert(
            section.name().to_string(),
            SectionSlot {
                section: Box::new(section),
                bundle: None,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn is_mounted(&self, name: &str) -> bool {
        self.sections
            .get(name)
            .map(|s| s.bundle.is_some())
            .unwrap_or(false)
    }

    /// Mount every unmounted section in page order
    ///
    /// A section whose mount fails is logged and skipped; its siblings
    /// still mount. Returns the number of sections mounted by this call.
    pub fn mount_all(&mut self, ctx: &mut MountCtx<'_>) -> usize {
        let mut mounted = 0;
        for (name, slot) in self.sections.iter_mut() {
            if slot.bundle.is_some() {
                continue;
            }
            match slot.section.mount(ctx) {
                Ok(bundle) => {
                    slot.bundle = Some(bundle);
                    mounted += 1;
                }
                Err(err) => {
                    tracing::warn!(section = %name, %err, "section failed to mount");
                }
            }
        }
        mounted
    }

    /// Unmount one section, disposing everything it registered
    pub fn unmount(&mut self, name: &str) {
        if let Some(slot) = self.sections.get_mut(name) {
            if let Some(mut bundle) = slot.bundle.take() {
                bundle.dispose();
            }
        }
    }

    /// Unmount every mounted section in reverse page order
    pub fn unmount_all(&mut self) {
        for (_, slot) in self.sections.iter_mut().rev() {
            if let Some(mut bundle) = slot.bundle.take() {
                bundle.dispose();
            }
        }
    }
}

impl Drop for SectionSet {
    fn drop(&mut self) {
        self.unmount_all();
    }
}
