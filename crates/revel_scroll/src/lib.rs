//! Revel Scroll Orchestration
//!
//! Maps a scroller's offset onto seekable timelines. One engine per
//! scroller drives:
//!
//! - **Triggers**: "element edge at viewport fraction" start/end ranges
//! - **Binders**: scroll progress → timeline seek, with scrub smoothing
//! - **Pins**: frozen ranges that convert scrolling into internal timeline
//!   progress and emit phase-change notifications
//! - **Conditions**: viewport-predicate dispatch with mutually exclusive
//!   desktop/mobile variants
//! - **Sections**: ordered composition with scoped disposal
//!
//! Everything ticks cooperatively on the host's frame loop; within one
//! frame every bound timeline reads the same scroll-offset snapshot.

pub mod binder;
pub mod condition;
pub mod dispose;
pub mod engine;
pub mod pin;
pub mod scroller;
pub mod section;
pub mod trigger;

pub use binder::ScrollBinder;
pub use condition::{
    ConditionCallback, ConditionGroup, ConditionPredicate, ConditionWatcher, VariantAttach,
    WatchId,
};
pub use dispose::{Disposer, DisposerBundle};
pub use engine::{BinderId, EngineHandle, GroupId, PinId, ScrollEngine, SharedTargetRegistry};
pub use pin::{PinCallbacks, PinController, PinPhase};
pub use scroller::{ScrollConfig, ScrollMotion, Scroller};
pub use section::{MountCtx, Section, SectionSet};
pub use trigger::{EdgeCondition, EndCondition, ResolvedRange, TriggerSpec};
