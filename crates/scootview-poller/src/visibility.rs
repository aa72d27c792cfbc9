//! Panel visibility predicates.
//!
//! A poller asks its predicate before requesting a buffer. The dashboard
//! owns a [`PanelVisibility`] and flips it from keyboard input.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use scootview_common::types::BufferId;

/// Decides whether a buffer's panel is currently shown.
#[derive(Clone)]
pub struct Visibility(Arc<dyn Fn(&BufferId) -> bool + Send + Sync>);

impl Visibility {
    /// Every buffer is visible.
    #[must_use]
    pub fn always() -> Self {
        Self::from_fn(|_| true)
    }

    /// Wraps an arbitrary predicate.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&BufferId) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn is_visible(&self, buffer: &BufferId) -> bool {
        (self.0)(buffer)
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visibility").finish_non_exhaustive()
    }
}

/// Shared set of hidden panels.
#[derive(Debug, Clone, Default)]
pub struct PanelVisibility {
    hidden: Arc<RwLock<BTreeSet<BufferId>>>,
}

impl PanelVisibility {
    /// All panels start visible.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows or hides a buffer's panel.
    pub fn set_visible(&self, buffer: &BufferId, visible: bool) {
        let mut hidden = self.hidden.write().unwrap_or_else(PoisonError::into_inner);
        if visible {
            let _ = hidden.remove(buffer);
        } else {
            let _ = hidden.insert(buffer.clone());
        }
    }

    /// Flips a panel and returns its new visibility.
    pub fn toggle(&self, buffer: &BufferId) -> bool {
        let visible = {
            let mut hidden = self.hidden.write().unwrap_or_else(PoisonError::into_inner);
            // `remove` succeeding means the panel was hidden and is now shown.
            hidden.remove(buffer) || !hidden.insert(buffer.clone())
        };
        tracing::debug!(buffer = %buffer, panel = %buffer.panel_id(), visible, "panel toggled");
        visible
    }

    /// Whether a buffer's panel is shown.
    #[must_use]
    pub fn is_visible(&self, buffer: &BufferId) -> bool {
        !self
            .hidden
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(buffer)
    }

    /// A predicate that reads this set on every call.
    #[must_use]
    pub fn predicate(&self) -> Visibility {
        let panels = self.clone();
        Visibility::from_fn(move |buffer| panels.is_visible(buffer))
    }
}
