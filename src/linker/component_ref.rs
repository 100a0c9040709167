//! Component Ref - Ownership handle for a dynamically created component.
//!
//! Everything except the component type and metadata is read through the
//! host element, so the handle always reflects the element's current state.
//! After `destroy()` the read-through accessors fail with
//! [`LinkerError::UseAfterDestroy`] instead of handing out stale values.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::config::{self, DoubleDestroy, LateDestroyCallback};
use crate::di::Injector;
use crate::error::{LinkerError, Result};
use crate::types::{ComponentType, Metadata};
use crate::view::{ChangeDetectorRef, ElementRef, HostElement, ViewRef};

/// Handle to one live component instance.
pub struct ComponentRef {
    host_element: Rc<dyn HostElement>,
    component_type: ComponentType,
    metadata: Metadata,
    destroyed: Cell<bool>,
}

impl ComponentRef {
    pub fn new(
        host_element: Rc<dyn HostElement>,
        component_type: ComponentType,
        metadata: Metadata,
    ) -> Self {
        Self {
            host_element,
            component_type,
            metadata,
            destroyed: Cell::new(false),
        }
    }

    /// Location of the host element.
    pub fn location(&self) -> Result<ElementRef> {
        self.ensure_alive()?;
        Ok(self.host_element.element_ref())
    }

    /// The injector the component instance lives in.
    pub fn injector(&self) -> Result<Rc<dyn Injector>> {
        self.ensure_alive()?;
        Ok(self.host_element.injector())
    }

    /// The component instance.
    pub fn instance(&self) -> Result<Rc<dyn Any>> {
        self.ensure_alive()?;
        self.host_element.component().ok_or_else(|| {
            LinkerError::construction(format!("{} has no instance", self.component_type))
        })
    }

    /// The component instance as a `T`.
    pub fn instance_as<T: 'static>(&self) -> Result<Rc<T>> {
        self.instance()?
            .downcast::<T>()
            .map_err(|_| LinkerError::InstanceType {
                expected: std::any::type_name::<T>(),
            })
    }

    /// The host view of this component.
    pub fn host_view(&self) -> Result<ViewRef> {
        self.ensure_alive()?;
        Ok(ViewRef::new(self.host_element.parent_view()))
    }

    /// Change detection for the host view. Same view as [`Self::host_view`].
    pub fn change_detector_ref(&self) -> Result<ChangeDetectorRef> {
        self.ensure_alive()?;
        Ok(ChangeDetectorRef::new(self.host_element.parent_view()))
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Metadata resolved when the component was created.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get() || self.host_element.parent_view().is_destroyed()
    }

    /// Destroy the component and its whole view subtree.
    ///
    /// A second call follows [`DoubleDestroy`] from the active config.
    pub fn destroy(&self) -> Result<()> {
        if self.is_destroyed() {
            return match config::config().double_destroy {
                DoubleDestroy::Error => {
                    tracing::warn!(component = %self.component_type, "destroy called on a destroyed component");
                    Err(self.use_after_destroy())
                }
                DoubleDestroy::Ignore => Ok(()),
            };
        }

        tracing::debug!(component = %self.component_type, "destroying component");
        // Set afterwards so callbacks registered during teardown still reach the view.
        self.host_element.parent_view().destroy();
        self.destroyed.set(true);
        Ok(())
    }

    /// Register a callback to run when the component is destroyed.
    ///
    /// Callbacks run once, in registration order. A callback registered by
    /// another callback during teardown runs after the ones already queued.
    /// Registration after destruction follows [`LateDestroyCallback`] from
    /// the active config.
    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        if !self.destroyed.get() {
            self.host_element.parent_view().on_destroy(Box::new(callback));
            return;
        }
        match config::config().late_on_destroy {
            LateDestroyCallback::FireImmediately => {
                tracing::trace!(component = %self.component_type, "firing late destroy callback");
                callback();
            }
            LateDestroyCallback::Drop => {
                tracing::debug!(component = %self.component_type, "dropping late destroy callback");
            }
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(self.use_after_destroy());
        }
        Ok(())
    }

    fn use_after_destroy(&self) -> LinkerError {
        LinkerError::UseAfterDestroy {
            component: self.component_type,
        }
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("component_type", &self.component_type)
            .field("metadata", &self.metadata)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::config::{reset_config, set_config, LinkerConfig};
    use crate::linker::testing::{injector_with_view_utils, RecordingView};
    use crate::view::HostView;

    struct Greeter {
        name: &'static str,
    }

    fn greeter_ref() -> (ComponentRef, Rc<RecordingView>) {
        reset_config();
        let view = RecordingView::new(Rc::new(Greeter { name: "world" }), injector_with_view_utils());
        let element = view.create(Vec::new(), None).unwrap();
        let component = ComponentRef::new(element, ComponentType::of::<Greeter>(), Metadata::of(["X"]));
        (component, view)
    }

    #[test]
    fn test_read_through_accessors() {
        let (component, _view) = greeter_ref();

        assert_eq!(component.instance_as::<Greeter>().unwrap().name, "world");
        assert_eq!(component.location().unwrap().downcast_ref::<&str>(), Some(&"host"));
        assert!(component.injector().is_ok());
        assert_eq!(component.component_type(), ComponentType::of::<Greeter>());
        assert_eq!(component.metadata().len(), 1);
    }

    #[test]
    fn test_instance_as_wrong_type() {
        let (component, _view) = greeter_ref();
        assert!(matches!(
            component.instance_as::<String>(),
            Err(LinkerError::InstanceType { .. })
        ));
    }

    #[test]
    fn test_host_view_and_change_detector_share_view() {
        let (component, view) = greeter_ref();

        let host_view = component.host_view().unwrap();
        let cd = component.change_detector_ref().unwrap();
        assert!(cd.same_view_as(&host_view));

        cd.mark_for_check();
        host_view.mark_for_check();
        assert_eq!(view.marks.get(), 2);
    }

    #[test]
    fn test_destroy_runs_callbacks_in_order() {
        let (component, view) = greeter_ref();
        let log = Rc::new(RefCell::new(Vec::new()));

        for n in 1..=3 {
            let log = log.clone();
            component.on_destroy(move || log.borrow_mut().push(n));
        }

        component.destroy().unwrap();

        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(view.destroy_calls.get(), 1);
        assert!(component.is_destroyed());
    }

    #[test]
    fn test_accessors_fail_after_destroy() {
        let (component, _view) = greeter_ref();
        component.destroy().unwrap();

        let expected = LinkerError::UseAfterDestroy {
            component: ComponentType::of::<Greeter>(),
        };
        assert_eq!(component.instance().err(), Some(expected.clone()));
        assert_eq!(component.location().err(), Some(expected.clone()));
        assert_eq!(component.host_view().err().map(|e| e.to_string()), Some(expected.to_string()));
        assert!(component.injector().is_err());
        assert!(component.change_detector_ref().is_err());

        // Immutable data stays readable.
        assert_eq!(component.component_type(), ComponentType::of::<Greeter>());
        assert_eq!(component.metadata().len(), 1);
    }

    #[test]
    fn test_double_destroy_errors_by_default() {
        let (component, view) = greeter_ref();

        component.destroy().unwrap();
        assert!(matches!(
            component.destroy(),
            Err(LinkerError::UseAfterDestroy { .. })
        ));
        assert_eq!(view.destroy_calls.get(), 1);
    }

    #[test]
    fn test_double_destroy_ignored_when_configured() {
        let (component, view) = greeter_ref();
        set_config(LinkerConfig {
            double_destroy: DoubleDestroy::Ignore,
            ..Default::default()
        });

        component.destroy().unwrap();
        component.destroy().unwrap();
        assert_eq!(view.destroy_calls.get(), 1);
        reset_config();
    }

    #[test]
    fn test_view_destroyed_elsewhere_counts_as_destroyed() {
        let (component, view) = greeter_ref();

        view.destroy();

        assert!(component.is_destroyed());
        assert!(component.instance().is_err());
    }

    #[test]
    fn test_late_on_destroy_fires_immediately() {
        let (component, _view) = greeter_ref();
        component.destroy().unwrap();

        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        component.on_destroy(move || f.set(f.get() + 1));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_late_on_destroy_dropped_when_configured() {
        let (component, _view) = greeter_ref();
        component.destroy().unwrap();
        set_config(LinkerConfig {
            late_on_destroy: LateDestroyCallback::Drop,
            ..Default::default()
        });

        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        component.on_destroy(move || f.set(true));
        assert!(!fired.get());
        reset_config();
    }

    #[test]
    fn test_callback_registered_during_teardown_runs_last() {
        let (component, _view) = greeter_ref();
        let component = Rc::new(component);
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_component = component.clone();
        let log = order.clone();
        component.on_destroy(move || {
            log.borrow_mut().push("A");
            let log = log.clone();
            inner_component.on_destroy(move || log.borrow_mut().push("C"));
        });
        let log = order.clone();
        component.on_destroy(move || log.borrow_mut().push("B"));

        component.destroy().unwrap();
        assert_eq!(*order.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_callback_registered_during_teardown_is_not_late() {
        let (component, _view) = greeter_ref();
        set_config(LinkerConfig {
            late_on_destroy: LateDestroyCallback::Drop,
            ..Default::default()
        });
        let component = Rc::new(component);
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_component = component.clone();
        let inner_log = log.clone();
        component.on_destroy(move || {
            inner_log.borrow_mut().push("outer");
            let l = inner_log.clone();
            inner_component.on_destroy(move || l.borrow_mut().push("inner"));
        });

        component.destroy().unwrap();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        reset_config();
    }
}
