//! Host view contracts.
//!
//! A view factory builds a [`HostView`]; materializing it yields a
//! [`HostElement`] that owns the live component instance. Callers reach the
//! view through two capabilities over the same object: [`ViewRef`] for
//! lifecycle and [`ChangeDetectorRef`] for change detection only.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::di::Injector;
use crate::error::Result;
use crate::types::{ProjectableNodes, RootTarget};
use super::element_ref::ElementRef;
use super::view_utils::ViewUtils;

/// Callback run once when a view is destroyed.
pub type DestroyCallback = Box<dyn FnOnce()>;

/// Builds a host view from view utilities, an injector and an optional
/// declaring element. Factories always pass `None`: host views are never
/// nested under a declaring element.
pub type ViewFactory = Rc<
    dyn Fn(Rc<ViewUtils>, Rc<dyn Injector>, Option<Rc<dyn HostElement>>) -> Result<Rc<dyn HostView>>,
>;

/// A view subtree that can be materialized, checked and destroyed.
pub trait HostView {
    /// Materialize the view, attaching `projectable_nodes` to content slots.
    ///
    /// `root` is either a selector, an existing element, or `None` for a
    /// detached host element.
    fn create(
        &self,
        projectable_nodes: ProjectableNodes,
        root: Option<RootTarget>,
    ) -> Result<Rc<dyn HostElement>>;

    /// Tear down the view and everything nested in it.
    fn destroy(&self);

    /// Register a callback to run when the view is destroyed.
    ///
    /// Registrations made while callbacks are running join the queue.
    /// Registrations after teardown follow the configured
    /// [`LateDestroyCallback`](crate::config::LateDestroyCallback) policy.
    fn on_destroy(&self, callback: DestroyCallback);

    fn is_destroyed(&self) -> bool;

    /// Run change detection for this view and its attached children.
    fn detect_changes(&self) -> Result<()>;

    /// Fail if any attached view in the subtree is still dirty.
    fn check_no_changes(&self) -> Result<()>;

    /// Mark this view and its ancestors for checking.
    fn mark_for_check(&self);

    /// Exclude the subtree from change detection.
    fn detach(&self);

    /// Include the subtree in change detection again.
    fn reattach(&self);
}

/// The root element of a materialized host view.
pub trait HostElement {
    fn element_ref(&self) -> ElementRef;

    fn injector(&self) -> Rc<dyn Injector>;

    /// The live component instance, once construction has set it.
    fn component(&self) -> Option<Rc<dyn Any>>;

    /// The view that owns this element.
    fn parent_view(&self) -> Rc<dyn HostView>;
}

fn same_view(a: &Rc<dyn HostView>, b: &Rc<dyn HostView>) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

// =============================================================================
// View Ref
// =============================================================================

/// Lifecycle capability over a host view.
#[derive(Clone)]
pub struct ViewRef {
    view: Rc<dyn HostView>,
}

impl ViewRef {
    pub fn new(view: Rc<dyn HostView>) -> Self {
        Self { view }
    }

    pub fn destroy(&self) {
        self.view.destroy();
    }

    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        self.view.on_destroy(Box::new(callback));
    }

    pub fn destroyed(&self) -> bool {
        self.view.is_destroyed()
    }

    pub fn detect_changes(&self) -> Result<()> {
        self.view.detect_changes()
    }

    pub fn check_no_changes(&self) -> Result<()> {
        self.view.check_no_changes()
    }

    pub fn mark_for_check(&self) {
        self.view.mark_for_check();
    }

    pub fn detach(&self) {
        self.view.detach();
    }

    pub fn reattach(&self) {
        self.view.reattach();
    }

    /// The change-detection capability of the same view.
    pub fn change_detector(&self) -> ChangeDetectorRef {
        ChangeDetectorRef::new(self.view.clone())
    }

    pub fn view(&self) -> &Rc<dyn HostView> {
        &self.view
    }

    pub fn ptr_eq(&self, other: &ViewRef) -> bool {
        same_view(&self.view, &other.view)
    }
}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRef")
            .field("destroyed", &self.destroyed())
            .finish()
    }
}

// =============================================================================
// Change Detector Ref
// =============================================================================

/// Change-detection capability over a host view.
///
/// Wraps the same object as the [`ViewRef`] it was taken from.
#[derive(Clone)]
pub struct ChangeDetectorRef {
    view: Rc<dyn HostView>,
}

impl ChangeDetectorRef {
    pub fn new(view: Rc<dyn HostView>) -> Self {
        Self { view }
    }

    pub fn mark_for_check(&self) {
        self.view.mark_for_check();
    }

    pub fn detach(&self) {
        self.view.detach();
    }

    pub fn reattach(&self) {
        self.view.reattach();
    }

    pub fn detect_changes(&self) -> Result<()> {
        self.view.detect_changes()
    }

    pub fn check_no_changes(&self) -> Result<()> {
        self.view.check_no_changes()
    }

    /// Check whether this detector and `view_ref` wrap the same view.
    pub fn same_view_as(&self, view_ref: &ViewRef) -> bool {
        same_view(&self.view, &view_ref.view)
    }
}

impl fmt::Debug for ChangeDetectorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeDetectorRef(..)")
    }
}
