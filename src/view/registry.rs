//! View Registry - Id allocation for live views.
//!
//! Tracks every view of the reference pipeline that is alive on this thread:
//! - View id allocation (`v0`, `v1`, ...)
//! - Id -> component type mapping
//! - Reactive live count (effects re-run when views come and go)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use spark_signals::{signal, Signal};

use crate::types::ComponentType;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map view id to the component type it hosts.
    static LIVE_VIEWS: RefCell<HashMap<String, ComponentType>> = RefCell::new(HashMap::new());

    /// Counter for generating unique view ids. Ids are never reused.
    static NEXT_VIEW_ID: Cell<usize> = const { Cell::new(0) };

    /// Number of live views, as a signal so deriveds/effects can track it.
    static LIVE_COUNT: Signal<usize> = signal(0);
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocate an id for a new view hosting `component_type`.
pub fn allocate_view_id(component_type: ComponentType) -> String {
    let id = NEXT_VIEW_ID.with(|next| {
        let n = next.get();
        next.set(n + 1);
        format!("v{n}")
    });

    let count = LIVE_VIEWS.with(|views| {
        let mut views = views.borrow_mut();
        views.insert(id.clone(), component_type);
        views.len()
    });
    LIVE_COUNT.with(|c| c.set(count));

    id
}

/// Release a view id. Unknown ids are ignored, as are releases that happen
/// while the thread's registry is being torn down.
pub fn release_view_id(id: &str) {
    let released = LIVE_VIEWS
        .try_with(|views| {
            let mut views = views.borrow_mut();
            views.remove(id).map(|_| views.len())
        })
        .ok()
        .flatten();
    if let Some(count) = released {
        let _ = LIVE_COUNT.try_with(|c| c.set(count));
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Check if a view id is currently live.
pub fn is_live(id: &str) -> bool {
    LIVE_VIEWS.with(|views| views.borrow().contains_key(id))
}

/// Get the count of live views.
pub fn live_view_count() -> usize {
    LIVE_VIEWS.with(|views| views.borrow().len())
}

/// Get the live count signal for reactive tracking.
pub fn live_view_count_signal() -> Signal<usize> {
    LIVE_COUNT.with(|c| c.clone())
}

/// Ids of live views hosting `component_type`, sorted.
pub fn live_views_of(component_type: ComponentType) -> Vec<String> {
    let mut ids: Vec<String> = LIVE_VIEWS.with(|views| {
        views
            .borrow()
            .iter()
            .filter(|(_, ty)| **ty == component_type)
            .map(|(id, _)| id.clone())
            .collect()
    });
    ids.sort();
    ids
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    LIVE_VIEWS.with(|views| views.borrow_mut().clear());
    NEXT_VIEW_ID.with(|next| next.set(0));
    LIVE_COUNT.with(|c| c.set(0));
}
