//! Linker - Dynamic component creation.
//!
//! - [`ComponentFactory`]: builds components outside of templates
//! - [`ComponentRef`]: owns one created component until it is destroyed

mod component_factory;
mod component_ref;

pub use component_factory::ComponentFactory;
pub use component_ref::ComponentRef;

/// Recording host view used by the linker's unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::any::Any;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::{Rc, Weak};

    use crate::config::{self, LateDestroyCallback};
    use crate::di::{Injector, StaticInjector};
    use crate::error::{LinkerError, Result};
    use crate::types::{ProjectableNodes, RootTarget};
    use crate::view::{DestroyCallback, ElementRef, HostElement, HostView, ViewFactory, ViewUtils};

    pub struct RecordingView {
        this: Weak<RecordingView>,
        instance: Rc<dyn Any>,
        injector: Rc<dyn Injector>,
        pub created_with: RefCell<Option<(usize, Option<RootTarget>)>>,
        pub destroy_calls: Cell<usize>,
        pub marks: Cell<usize>,
        destroyed: Cell<bool>,
        draining: Cell<bool>,
        callbacks: RefCell<VecDeque<DestroyCallback>>,
    }

    impl RecordingView {
        pub fn new(instance: Rc<dyn Any>, injector: Rc<dyn Injector>) -> Rc<Self> {
            Rc::new_cyclic(|this| RecordingView {
                this: this.clone(),
                instance,
                injector,
                created_with: RefCell::new(None),
                destroy_calls: Cell::new(0),
                marks: Cell::new(0),
                destroyed: Cell::new(false),
                draining: Cell::new(false),
                callbacks: RefCell::new(VecDeque::new()),
            })
        }
    }

    impl HostView for RecordingView {
        fn create(
            &self,
            projectable_nodes: ProjectableNodes,
            root: Option<RootTarget>,
        ) -> Result<Rc<dyn HostElement>> {
            *self.created_with.borrow_mut() = Some((projectable_nodes.len(), root));
            let view = self
                .this
                .upgrade()
                .ok_or_else(|| LinkerError::construction("view dropped"))?;
            let element: Rc<dyn HostElement> = Rc::new(RecordingElement {
                element_ref: ElementRef::new("host"),
                view,
            });
            Ok(element)
        }

        fn destroy(&self) {
            self.destroy_calls.set(self.destroy_calls.get() + 1);
            if self.destroyed.replace(true) {
                return;
            }
            self.draining.set(true);
            loop {
                let next = self.callbacks.borrow_mut().pop_front();
                match next {
                    Some(callback) => callback(),
                    None => break,
                }
            }
            self.draining.set(false);
        }

        fn on_destroy(&self, callback: DestroyCallback) {
            if !self.destroyed.get() || self.draining.get() {
                self.callbacks.borrow_mut().push_back(callback);
                return;
            }
            match config::config().late_on_destroy {
                LateDestroyCallback::FireImmediately => callback(),
                LateDestroyCallback::Drop => {}
            }
        }

        fn is_destroyed(&self) -> bool {
            self.destroyed.get()
        }

        fn detect_changes(&self) -> Result<()> {
            Ok(())
        }

        fn check_no_changes(&self) -> Result<()> {
            Ok(())
        }

        fn mark_for_check(&self) {
            self.marks.set(self.marks.get() + 1);
        }

        fn detach(&self) {}

        fn reattach(&self) {}
    }

    pub struct RecordingElement {
        element_ref: ElementRef,
        view: Rc<RecordingView>,
    }

    impl HostElement for RecordingElement {
        fn element_ref(&self) -> ElementRef {
            self.element_ref.clone()
        }

        fn injector(&self) -> Rc<dyn Injector> {
            self.view.injector.clone()
        }

        fn component(&self) -> Option<Rc<dyn Any>> {
            Some(self.view.instance.clone())
        }

        fn parent_view(&self) -> Rc<dyn HostView> {
            self.view.clone()
        }
    }

    /// Views built by a [`recording_factory`], in creation order.
    pub type Built = Rc<RefCell<Vec<Rc<RecordingView>>>>;

    /// View factory building a fresh `RecordingView` per call, each with a
    /// new instance from `make_instance`.
    pub fn recording_factory(make_instance: impl Fn() -> Rc<dyn Any> + 'static) -> (ViewFactory, Built) {
        let built: Built = Rc::new(RefCell::new(Vec::new()));
        let built_clone = built.clone();
        let factory: ViewFactory = Rc::new(
            move |_: Rc<ViewUtils>,
                  injector: Rc<dyn Injector>,
                  declaration: Option<Rc<dyn HostElement>>|
                  -> Result<Rc<dyn HostView>> {
                if declaration.is_some() {
                    return Err(LinkerError::construction("host view got a declaration element"));
                }
                let view = RecordingView::new(make_instance(), injector);
                built_clone.borrow_mut().push(view.clone());
                Ok(view as Rc<dyn HostView>)
            },
        );
        (factory, built)
    }

    pub fn injector_with_view_utils() -> Rc<dyn Injector> {
        StaticInjector::new().provide(ViewUtils::new("test")).into_rc()
    }
}
