//! App View - Reference host view implementation.
//!
//! A view owns one component instance and the views nested under it:
//!
//! ```text
//! AppView (host, v0)  ──create──▶  AppElement (element_ref, instance)
//!   ├─ AppView (component, v1)       declared by v0's element
//!   └─ AppView (component, v2)
//!        └─ AppView (component, v3)
//! ```
//!
//! Parents hold children strongly; children point back weakly. Elements hold
//! their view strongly, so a handle that keeps the element keeps the subtree.
//!
//! # Teardown
//!
//! `destroy` is depth-first: children go first, then the view's own destroy
//! callbacks in registration order, then the registry entry. Callbacks
//! registered while the queue drains join the end of the queue.
//!
//! A view dropped without `destroy` still gives its registry entry back.

use std::any::Any;
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::config::{self, LateDestroyCallback};
use crate::di::Injector;
use crate::error::{LinkerError, Result};
use crate::types::{ComponentType, ProjectableNodes, RootTarget};
use super::element_ref::{ElementRef, NativeElement};
use super::host::{DestroyCallback, HostElement, HostView, ViewFactory};
use super::registry;
use super::view_utils::ViewUtils;

// =============================================================================
// Types
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle and change-detection state of a view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u8 {
        /// `create` has materialized the view.
        const CREATED = 1 << 0;
        /// The view has been torn down. Terminal.
        const DESTROYED = 1 << 1;
        /// Skipped by change detection until reattached.
        const DETACHED = 1 << 2;
        /// Checked on every pass, not only when marked dirty.
        const CHECK_ALWAYS = 1 << 3;
        /// Destroy callbacks are being drained.
        const TEARING_DOWN = 1 << 4;
    }
}

/// Where a view sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Root of a dynamically created component. No declaring element.
    Host,
    /// Declared by an element of another view.
    Component,
}

/// Builds the component instance while its view materializes.
pub type ComponentBuilder = Rc<dyn Fn(&BuildContext<'_>) -> Result<Rc<dyn Any>>>;

/// Hook run each time change detection checks a view.
pub type CheckHook = Rc<dyn Fn()>;

/// Wrap a closure building a `T` into a [`ComponentBuilder`].
pub fn component_builder<T, F>(build: F) -> ComponentBuilder
where
    T: 'static,
    F: Fn(&BuildContext<'_>) -> Result<T> + 'static,
{
    erased_builder(move |ctx| build(ctx).map(|instance| Rc::new(instance) as Rc<dyn Any>))
}

/// Wrap a closure that already returns a shared instance.
pub fn erased_builder<F>(build: F) -> ComponentBuilder
where
    F: Fn(&BuildContext<'_>) -> Result<Rc<dyn Any>> + 'static,
{
    Rc::new(build)
}

// =============================================================================
// App View
// =============================================================================

pub struct AppView {
    id: String,
    render_id: String,
    component_type: ComponentType,
    kind: ViewKind,
    view_utils: Rc<ViewUtils>,
    injector: Rc<dyn Injector>,
    builder: ComponentBuilder,
    this: Weak<AppView>,
    parent: Weak<AppView>,
    children: RefCell<Vec<Rc<AppView>>>,
    flags: Cell<ViewFlags>,
    dirty: Signal<bool>,
    check_hook: RefCell<Option<CheckHook>>,
    destroy_callbacks: RefCell<VecDeque<DestroyCallback>>,
}

impl AppView {
    /// Create an unmaterialized view.
    ///
    /// With a `declaration` element the view becomes a child of that
    /// element's view; without one it is a host view.
    pub fn new(
        component_type: ComponentType,
        view_utils: Rc<ViewUtils>,
        injector: Rc<dyn Injector>,
        declaration: Option<&Rc<AppElement>>,
        builder: ComponentBuilder,
    ) -> Rc<AppView> {
        let parent = declaration.map(|el| el.parent_view.clone());
        let kind = if parent.is_some() {
            ViewKind::Component
        } else {
            ViewKind::Host
        };

        let view = Rc::new_cyclic(|this| AppView {
            id: registry::allocate_view_id(component_type),
            render_id: view_utils.next_render_id(),
            component_type,
            kind,
            view_utils,
            injector,
            builder,
            this: this.clone(),
            parent: parent.as_ref().map(Rc::downgrade).unwrap_or_default(),
            children: RefCell::new(Vec::new()),
            flags: Cell::new(ViewFlags::CHECK_ALWAYS),
            dirty: signal(false),
            check_hook: RefCell::new(None),
            destroy_callbacks: RefCell::new(VecDeque::new()),
        });

        if let Some(parent) = parent {
            parent.children.borrow_mut().push(view.clone());
        }

        tracing::debug!(
            view = %view.id,
            component = %component_type,
            kind = ?kind,
            "view created"
        );
        view
    }

    /// A view factory that builds host views for `component_type`.
    ///
    /// The factory rejects a declaring element.
    pub fn factory(component_type: ComponentType, builder: ComponentBuilder) -> ViewFactory {
        Rc::new(
            move |view_utils: Rc<ViewUtils>,
                  injector: Rc<dyn Injector>,
                  declaration: Option<Rc<dyn HostElement>>|
                  -> Result<Rc<dyn HostView>> {
                if declaration.is_some() {
                    return Err(LinkerError::construction(format!(
                        "{component_type} host views take no declaration element"
                    )));
                }
                let view = AppView::new(component_type, view_utils, injector, None, builder.clone());
                Ok(view as Rc<dyn HostView>)
            },
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn render_id(&self) -> &str {
        &self.render_id
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags.get()
    }

    pub fn children(&self) -> Vec<Rc<AppView>> {
        self.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<Rc<AppView>> {
        self.parent.upgrade()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Get the dirty signal for reactive tracking.
    pub fn dirty_signal(&self) -> Signal<bool> {
        self.dirty.clone()
    }

    /// Only check this view when it is marked dirty.
    pub fn set_on_push(&self) {
        self.remove_flags(ViewFlags::CHECK_ALWAYS);
    }

    /// Set the hook run each time this view is checked.
    pub fn set_check_hook(&self, hook: impl Fn() + 'static) {
        *self.check_hook.borrow_mut() = Some(Rc::new(hook));
    }

    fn has(&self, flags: ViewFlags) -> bool {
        self.flags.get().contains(flags)
    }

    fn insert_flags(&self, flags: ViewFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    fn remove_flags(&self, flags: ViewFlags) {
        self.flags.set(self.flags.get() - flags);
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.has(ViewFlags::DESTROYED) {
            return Err(LinkerError::UseAfterDestroy {
                component: self.component_type,
            });
        }
        Ok(())
    }

    fn resolve_root(&self, root: Option<RootTarget>) -> ElementRef {
        match root {
            Some(RootTarget::Selector(selector)) => ElementRef::new(NativeElement::Root { selector }),
            Some(RootTarget::Element(element)) => element,
            None => ElementRef::new(NativeElement::Detached {
                name: self.render_id.clone(),
            }),
        }
    }

    fn materialize(
        &self,
        projectable_nodes: ProjectableNodes,
        root: Option<RootTarget>,
    ) -> Result<Rc<AppElement>> {
        self.ensure_alive()?;
        if self.has(ViewFlags::CREATED) {
            return Err(LinkerError::construction(format!(
                "view {} was already created",
                self.id
            )));
        }
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| LinkerError::construction("view dropped during create"))?;

        let element = Rc::new(AppElement {
            element_ref: self.resolve_root(root),
            injector: self.injector.clone(),
            component: OnceCell::new(),
            parent_view: this,
        });

        let ctx = BuildContext {
            view: self,
            element: &element,
            projectable_nodes: &projectable_nodes,
        };
        let instance = match (self.builder)(&ctx) {
            Ok(instance) => instance,
            Err(err) => {
                // Nothing half-built stays reachable.
                self.teardown();
                return Err(err);
            }
        };
        // A fresh cell cannot already be set.
        let _ = element.component.set(instance);

        self.insert_flags(ViewFlags::CREATED);
        tracing::debug!(view = %self.id, element = ?element.element_ref, "view materialized");
        Ok(element)
    }

    fn teardown(&self) {
        self.insert_flags(ViewFlags::DESTROYED | ViewFlags::TEARING_DOWN);

        // Children first. The list is taken so they don't unlink from us mid-iteration.
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.destroy();
        }

        tracing::trace!(
            view = %self.id,
            callbacks = self.destroy_callbacks.borrow().len(),
            "running destroy callbacks"
        );
        loop {
            // The borrow ends before the call so callbacks can register more.
            let next = self.destroy_callbacks.borrow_mut().pop_front();
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.remove_flags(ViewFlags::TEARING_DOWN);

        self.check_hook.borrow_mut().take();
        self.dirty.set(false);
        registry::release_view_id(&self.id);

        if let Some(parent) = self.parent.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|child| !std::ptr::eq(Rc::as_ptr(child), self));
        }
    }

    fn check(&self, throw_on_change: bool) -> Result<()> {
        self.ensure_alive()?;
        if self.has(ViewFlags::DETACHED) {
            return Ok(());
        }

        if throw_on_change {
            if self.dirty.get() {
                return Err(LinkerError::ExpressionChanged {
                    view: self.id.clone(),
                });
            }
        } else if self.has(ViewFlags::CHECK_ALWAYS) || self.dirty.get() {
            // Cleared before the hook so a hook that marks the view again
            // leaves it dirty.
            self.dirty.set(false);
            let hook = self.check_hook.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        }

        for child in self.children() {
            child.check(throw_on_change)?;
        }
        Ok(())
    }
}

impl HostView for AppView {
    fn create(
        &self,
        projectable_nodes: ProjectableNodes,
        root: Option<RootTarget>,
    ) -> Result<Rc<dyn HostElement>> {
        let element = self.materialize(projectable_nodes, root)?;
        Ok(element as Rc<dyn HostElement>)
    }

    fn destroy(&self) {
        if self.has(ViewFlags::DESTROYED) {
            tracing::trace!(view = %self.id, "view already destroyed");
            return;
        }
        tracing::debug!(view = %self.id, component = %self.component_type, "destroying view");
        self.teardown();
    }

    fn on_destroy(&self, callback: DestroyCallback) {
        if !self.has(ViewFlags::DESTROYED) || self.has(ViewFlags::TEARING_DOWN) {
            self.destroy_callbacks.borrow_mut().push_back(callback);
            return;
        }
        match config::config().late_on_destroy {
            LateDestroyCallback::FireImmediately => callback(),
            LateDestroyCallback::Drop => {
                tracing::debug!(view = %self.id, "dropping destroy callback registered after destroy");
            }
        }
    }

    fn is_destroyed(&self) -> bool {
        self.has(ViewFlags::DESTROYED)
    }

    fn detect_changes(&self) -> Result<()> {
        self.check(false)
    }

    fn check_no_changes(&self) -> Result<()> {
        self.check(true)
    }

    fn mark_for_check(&self) {
        self.dirty.set(true);
        let mut parent = self.parent.upgrade();
        while let Some(view) = parent {
            view.dirty.set(true);
            parent = view.parent.upgrade();
        }
    }

    fn detach(&self) {
        self.insert_flags(ViewFlags::DETACHED);
    }

    fn reattach(&self) {
        self.remove_flags(ViewFlags::DETACHED);
        self.mark_for_check();
    }
}

impl Drop for AppView {
    fn drop(&mut self) {
        if !self.has(ViewFlags::DESTROYED) {
            tracing::trace!(view = %self.id, "view dropped without destroy");
            registry::release_view_id(&self.id);
        }
    }
}

impl fmt::Debug for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppView")
            .field("id", &self.id)
            .field("component_type", &self.component_type)
            .field("kind", &self.kind)
            .field("flags", &self.flags.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

// =============================================================================
// App Element
// =============================================================================

/// Host element of an [`AppView`].
pub struct AppElement {
    element_ref: ElementRef,
    injector: Rc<dyn Injector>,
    component: OnceCell<Rc<dyn Any>>,
    parent_view: Rc<AppView>,
}

impl AppElement {
    pub fn view(&self) -> &Rc<AppView> {
        &self.parent_view
    }
}

impl HostElement for AppElement {
    fn element_ref(&self) -> ElementRef {
        self.element_ref.clone()
    }

    fn injector(&self) -> Rc<dyn Injector> {
        self.injector.clone()
    }

    fn component(&self) -> Option<Rc<dyn Any>> {
        self.component.get().cloned()
    }

    fn parent_view(&self) -> Rc<dyn HostView> {
        self.parent_view.clone()
    }
}

impl fmt::Debug for AppElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppElement")
            .field("element_ref", &self.element_ref)
            .field("view", &self.parent_view.id)
            .finish()
    }
}

// =============================================================================
// Build Context
// =============================================================================

/// What a [`ComponentBuilder`] sees while its view materializes.
pub struct BuildContext<'a> {
    view: &'a AppView,
    element: &'a Rc<AppElement>,
    projectable_nodes: &'a ProjectableNodes,
}

impl BuildContext<'_> {
    pub fn injector(&self) -> &Rc<dyn Injector> {
        &self.view.injector
    }

    pub fn view_utils(&self) -> &Rc<ViewUtils> {
        &self.view.view_utils
    }

    pub fn view(&self) -> &AppView {
        self.view
    }

    pub fn element_ref(&self) -> &ElementRef {
        &self.element.element_ref
    }

    /// Content nodes for slot `index`, empty if the slot wasn't supplied.
    pub fn projected(&self, index: usize) -> &[crate::types::ContentNode] {
        self.projectable_nodes
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn projectable_nodes(&self) -> &ProjectableNodes {
        self.projectable_nodes
    }

    /// Create and materialize a component view nested under this element.
    pub fn create_child(
        &self,
        component_type: ComponentType,
        builder: ComponentBuilder,
        projectable_nodes: ProjectableNodes,
    ) -> Result<Rc<AppElement>> {
        let child = AppView::new(
            component_type,
            self.view.view_utils.clone(),
            self.view.injector.clone(),
            Some(self.element),
            builder,
        );
        child.materialize(projectable_nodes, None)
    }

    pub fn set_check_hook(&self, hook: impl Fn() + 'static) {
        self.view.set_check_hook(hook);
    }

    pub fn set_on_push(&self) {
        self.view.set_on_push();
    }
}

// =============================================================================
// Tests
// =============================================================================
