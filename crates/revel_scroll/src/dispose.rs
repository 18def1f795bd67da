//! Scoped resource disposal
//!
//! Every registration in the workspace hands back a disposer; a section
//! collects the disposers for everything it mounted into one bundle and
//! unmount invokes the bundle exactly once. Disposal is idempotent so a
//! double-unmount is harmless, and each closure runs at most once.

/// A single teardown action, invoked at most once
pub struct Disposer {
    action: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposer {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Run the teardown action; subsequent calls are no-ops
    pub fn dispose(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.is_none()
    }
}

/// The teardown actions owned by one mounted scope
#[derive(Default)]
pub struct DisposerBundle {
    disposers: Vec<Disposer>,
    disposed: bool,
}

impl DisposerBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a teardown action to the bundle
    pub fn push(&mut self, action: impl FnOnce() + Send + 'static) {
        self.disposers.push(Disposer::new(action));
    }

    pub fn push_disposer(&mut self, disposer: Disposer) {
        self.disposers.push(disposer);
    }

    /// Absorb another bundle's actions
    pub fn merge(&mut self, mut other: DisposerBundle) {
        self.disposers.append(&mut other.disposers);
        other.disposed = true;
    }

    /// Invoke all teardown actions in reverse registration order
    ///
    /// Idempotent: the second and later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for disposer in self.disposers.iter_mut().rev() {
            disposer.dispose();
        }
        self.disposers.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }
}

impl Drop for DisposerBundle {
    fn drop(&mut self) {
        self.dispose();
    }
}
