//! Viewport condition dispatch
//!
//! Named viewport predicates (`"min-width: 768px"`) gate which animation
//! variant is live. The [`ConditionWatcher`] is the only component that
//! observes viewport changes at the low level; everything else consumes
//! its callbacks or registers variants on a [`ConditionGroup`].
//!
//! Malformed predicates are rejected at registration: a predicate that
//! silently never matches would leave a page that looks broken with no
//! diagnostic.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt, value},
    number::complete::float,
    sequence::{delimited, preceded, terminated, tuple},
    Finish, IResult,
};
use slotmap::{new_key_type, SlotMap};

use revel_core::{Error, Size};

use crate::dispose::DisposerBundle;

new_key_type! {
    /// Handle to a watcher registration
    pub struct WatchId;
}

/// Callback fired when a predicate's truth value applies or flips
pub type ConditionCallback = Box<dyn FnMut() + Send>;

/// A parsed viewport predicate
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConditionPredicate {
    /// Viewport width >= the given px value
    MinWidth(f32),
    /// Viewport width <= the given px value
    MaxWidth(f32),
}

impl ConditionPredicate {
    /// Parse a predicate expression, e.g. `"min-width: 768px"` or
    /// `"(max-width: 767px)"`. Fails fast on anything else.
    pub fn parse(input: &str) -> Result<Self, Error> {
        match all_consuming(predicate)(input.trim()).finish() {
            Ok((_, pred)) => Ok(pred),
            Err(e) => Err(Error::MalformedPredicate {
                input: input.to_string(),
                reason: format!("{:?}", e.code),
            }),
        }
    }

    pub fn evaluate(&self, viewport: Size) -> bool {
        match self {
            ConditionPredicate::MinWidth(px) => viewport.width >= *px,
            ConditionPredicate::MaxWidth(px) => viewport.width <= *px,
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

fn predicate(input: &str) -> IResult<&str, ConditionPredicate> {
    alt((
        delimited(char('('), bare_predicate, char(')')),
        bare_predicate,
    ))(input)
}

fn bare_predicate(input: &str) -> IResult<&str, ConditionPredicate> {
    let (input, (bound, _, _, _, px)) = tuple((
        alt((
            value(Bound::Min, tag_no_case("min-width")),
            value(Bound::Max, tag_no_case("max-width")),
        )),
        multispace0,
        char(':'),
        multispace0,
        terminated(float, opt(preceded(multispace0, tag("px")))),
    ))(input)?;

    let pred = match bound {
        Bound::Min => ConditionPredicate::MinWidth(px),
        Bound::Max => ConditionPredicate::MaxWidth(px),
    };
    Ok((input, pred))
}

struct WatchEntry {
    predicate: ConditionPredicate,
    matched: bool,
    on_match: ConditionCallback,
    on_no_match: ConditionCallback,
}

/// Watches the viewport and dispatches predicate flips
pub struct ConditionWatcher {
    entries: SlotMap<WatchId, WatchEntry>,
    viewport: Size,
}

impl ConditionWatcher {
    pub fn new(viewport: Size) -> Self {
        Self {
            entries: SlotMap::with_key(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Register a predicate with match/no-match callbacks
    ///
    /// The callback matching the current state is invoked immediately;
    /// afterwards the opposite callback fires on every flip.
    pub fn register(
        &mut self,
        predicate: &str,
        on_match: ConditionCallback,
        on_no_match: ConditionCallback,
    ) -> Result<WatchId, Error> {
        let parsed = ConditionPredicate::parse(predicate)?;
        let matched = parsed.evaluate(self.viewport);

        let id = self.entries.insert(WatchEntry {
            predicate: parsed,
            matched,
            on_match,
            on_no_match,
        });

        let entry = &mut self.entries[id];
        if matched {
            (entry.on_match)();
        } else {
            (entry.on_no_match)();
        }
        Ok(id)
    }

    /// Update the viewport, firing callbacks for every flipped predicate
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        for (_, entry) in self.entries.iter_mut() {
            let now = entry.predicate.evaluate(viewport);
            if now != entry.matched {
                entry.matched = now;
                if now {
                    (entry.on_match)();
                } else {
                    (entry.on_no_match)();
                }
            }
        }
    }

    /// Remove a registration; safe to call with a stale id
    pub fn dispose(&mut self, id: WatchId) {
        self.entries.remove(id);
    }

    /// Live registrations; a non-zero count after section unmount is a leak
    pub fn watch_count(&self) -> usize {
        self.entries.len()
    }
}

/// Factory producing a variant's bindings when it goes live
pub type VariantAttach = Box<dyn FnMut() -> DisposerBundle + Send>;

struct Variant {
    label: String,
    predicate: ConditionPredicate,
    attach: VariantAttach,
    live: Option<DisposerBundle>,
}

/// A set of mutually exclusive animation variants for one effect
///
/// At most one variant is live at any instant. Switching disposes the
/// outgoing variant's bindings completely before the incoming variant
/// attaches, so two variants never drive the same targets.
pub struct ConditionGroup {
    name: String,
    variants: Vec<Variant>,
    active: Option<usize>,
}

impl ConditionGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            active: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a variant gated by a predicate expression
    pub fn variant(
        mut self,
        label: impl Into<String>,
        predicate: &str,
        attach: VariantAttach,
    ) -> Result<Self, Error> {
        self.variants.push(Variant {
            label: label.into(),
            predicate: ConditionPredicate::parse(predicate)?,
            attach,
            live: None,
        });
        Ok(self)
    }

    /// Re-evaluate against the viewport, switching variants if needed
    ///
    /// Returns true if the live variant changed.
    pub fn evaluate(&mut self, viewport: Size) -> bool {
        let next = self
            .variants
            .iter()
            .position(|v| v.predicate.evaluate(viewport));
        if next == self.active {
            return false;
        }

        if let Some(idx) = self.active {
            let variant = &mut self.variants[idx];
            tracing::debug!(group = %self.name, variant = %variant.label, "variant detached");
            if let Some(mut bundle) = variant.live.take() {
                bundle.dispose();
            }
        }

        if let Some(idx) = next {
            let variant = &mut self.variants[idx];
            tracing::debug!(group = %self.name, variant = %variant.label, "variant attached");
            variant.live = Some((variant.attach)());
        }

        self.active = next;
        true
    }

    /// Index of the live variant, if any predicate matches
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Number of variants currently holding live bindings
    pub fn live_count(&self) -> usize {
        self.variants.iter().filter(|v| v.live.is_some()).count()
    }

    /// Tear down whichever variant is live
    pub fn dispose_all(&mut self) {
        for variant in &mut self.variants {
            if let Some(mut bundle) = variant.live.take() {
                bundle.dispose();
            }
        }
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_parse_predicates() {
        assert_eq!(
            ConditionPredicate::parse("min-width: 768px").unwrap(),
            ConditionPredicate::MinWidth(768.0)
        );
        assert_eq!(
            ConditionPredicate::parse("(max-width: 767px)").unwrap(),
            ConditionPredicate::MaxWidth(767.0)
        );
        assert_eq!(
            ConditionPredicate::parse("min-width:1024").unwrap(),
            ConditionPredicate::MinWidth(1024.0)
        );
    }

    #[test]
    fn test_malformed_predicate_rejected() {
        assert!(ConditionPredicate::parse("min-height: 768px").is_err());
        assert!(ConditionPredicate::parse("min-width 768px").is_err());
        assert!(ConditionPredicate::parse("min-width: 768px garbage").is_err());
        assert!(ConditionPredicate::parse("").is_err());
    }

    #[test]
    fn test_evaluate() {
        let wide = Size::new(1280.0, 720.0);
        let narrow = Size::new(390.0, 844.0);
        assert!(ConditionPredicate::MinWidth(768.0).evaluate(wide));
        assert!(!ConditionPredicate::MinWidth(768.0).evaluate(narrow));
        assert!(ConditionPredicate::MaxWidth(767.0).evaluate(narrow));
    }

    #[test]
    fn test_watcher_immediate_and_flip() {
        let mut watcher = ConditionWatcher::new(Size::new(1280.0, 720.0));
        let matches = Arc::new(AtomicU32::new(0));
        let no_matches = Arc::new(AtomicU32::new(0));
        let (m, n) = (Arc::clone(&matches), Arc::clone(&no_matches));

        watcher
            .register(
                "min-width: 768px",
                Box::new(move || {
                    m.fetch_add(1, Ordering::SeqCst);
                }),
                Box::new(move || {
                    n.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        // Immediate invocation for the current state
        assert_eq!(matches.load(Ordering::SeqCst), 1);
        assert_eq!(no_matches.load(Ordering::SeqCst), 0);

        // No flip, no fire
        watcher.set_viewport(Size::new(1024.0, 720.0));
        assert_eq!(matches.load(Ordering::SeqCst), 1);

        // Flip fires the opposite callback once
        watcher.set_viewport(Size::new(390.0, 844.0));
        assert_eq!(no_matches.load(Ordering::SeqCst), 1);

        watcher.set_viewport(Size::new(1280.0, 720.0));
        assert_eq!(matches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_watcher_register_rejects_malformed() {
        let mut watcher = ConditionWatcher::new(Size::new(1280.0, 720.0));
        let result = watcher.register("width <= 768", Box::new(|| {}), Box::new(|| {}));
        assert!(matches!(result, Err(Error::MalformedPredicate { .. })));
        assert_eq!(watcher.watch_count(), 0);
    }

    #[test]
    fn test_watcher_dispose_stops_callbacks() {
        let mut watcher = ConditionWatcher::new(Size::new(1280.0, 720.0));
        let fired = Arc::new(AtomicU32::new(0));
        let f = Arc::clone(&fired);

        let id = watcher
            .register(
                "min-width: 768px",
                Box::new(move || {
                    f.fetch_add(1, Ordering::SeqCst);
                }),
                Box::new(|| {}),
            )
            .unwrap();

        watcher.dispose(id);
        watcher.dispose(id);
        assert_eq!(watcher.watch_count(), 0);

        watcher.set_viewport(Size::new(390.0, 844.0));
        watcher.set_viewport(Size::new(1280.0, 720.0));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_group_exactly_one_variant_live() {
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let desktop_log = Arc::clone(&log);
        let mobile_log = Arc::clone(&log);
        let mut group = ConditionGroup::new("hero-transition")
            .variant(
                "desktop",
                "min-width: 768px",
                Box::new(move || {
                    desktop_log.lock().unwrap().push("attach-desktop");
                    let teardown = Arc::clone(&desktop_log);
                    let mut bundle = DisposerBundle::new();
                    bundle.push(move || teardown.lock().unwrap().push("detach-desktop"));
                    bundle
                }),
            )
            .unwrap()
            .variant(
                "mobile",
                "max-width: 767px",
                Box::new(move || {
                    mobile_log.lock().unwrap().push("attach-mobile");
                    let teardown = Arc::clone(&mobile_log);
                    let mut bundle = DisposerBundle::new();
                    bundle.push(move || teardown.lock().unwrap().push("detach-mobile"));
                    bundle
                }),
            )
            .unwrap();

        group.evaluate(Size::new(1280.0, 720.0));
        assert_eq!(group.live_count(), 1);
        assert_eq!(group.active_index(), Some(0));

        // Flip to mobile: desktop torn down before mobile attaches
        group.evaluate(Size::new(390.0, 844.0));
        assert_eq!(group.live_count(), 1);
        assert_eq!(group.active_index(), Some(1));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["attach-desktop", "detach-desktop", "attach-mobile"]
        );

        // Unchanged viewport is a no-op
        assert!(!group.evaluate(Size::new(400.0, 844.0)));
        assert_eq!(group.live_count(), 1);
    }

    #[test]
    fn test_group_dispose_all() {
        let mut group = ConditionGroup::new("g")
            .variant("only", "min-width: 0px", Box::new(DisposerBundle::new))
            .unwrap();
        group.evaluate(Size::new(800.0, 600.0));
        assert_eq!(group.live_count(), 1);

        group.dispose_all();
        assert_eq!(group.live_count(), 0);
        assert_eq!(group.active_index(), None);
    }
}
