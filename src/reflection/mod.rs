//! Reflection fallback for component metadata.
//!
//! Factories built without a metadata table ask the thread's global
//! [`Reflector`] for annotations instead. The default reflector is an
//! [`AnnotationRegistry`] that hosts fill with [`register_annotations`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{ComponentType, Metadata};

/// Source of annotations for a component type.
pub trait Reflector {
    /// Annotations declared for `component_type`, empty if none.
    fn annotations_for(&self, component_type: &ComponentType) -> Metadata;
}

/// Reflector backed by an explicit type -> metadata map.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    annotations: RefCell<HashMap<ComponentType, Metadata>>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the annotations for `component_type`, replacing earlier ones.
    pub fn register(&self, component_type: ComponentType, metadata: Metadata) {
        self.annotations
            .borrow_mut()
            .insert(component_type, metadata);
    }

    pub fn clear(&self) {
        self.annotations.borrow_mut().clear();
    }
}

impl Reflector for AnnotationRegistry {
    fn annotations_for(&self, component_type: &ComponentType) -> Metadata {
        self.annotations
            .borrow()
            .get(component_type)
            .cloned()
            .unwrap_or_default()
    }
}

// =============================================================================
// Global Reflector
// =============================================================================

thread_local! {
    /// Registry used by `register_annotations` and as the default reflector.
    static REGISTRY: Rc<AnnotationRegistry> = Rc::new(AnnotationRegistry::new());

    /// Reflector consulted by factories. `None` means the registry above.
    static REFLECTOR: RefCell<Option<Rc<dyn Reflector>>> = const { RefCell::new(None) };
}

/// Get the active reflector.
pub fn reflector() -> Rc<dyn Reflector> {
    let custom = REFLECTOR.with(|r| r.borrow().clone());
    match custom {
        Some(reflector) => reflector,
        None => REGISTRY.with(|registry| registry.clone() as Rc<dyn Reflector>),
    }
}

/// Replace the active reflector.
pub fn set_reflector(reflector: Rc<dyn Reflector>) {
    REFLECTOR.with(|r| *r.borrow_mut() = Some(reflector));
}

/// Register annotations with the default registry.
pub fn register_annotations(component_type: ComponentType, metadata: Metadata) {
    REGISTRY.with(|registry| registry.register(component_type, metadata));
}

/// Shorthand for `reflector().annotations_for(..)`.
pub fn annotations_for(component_type: &ComponentType) -> Metadata {
    reflector().annotations_for(component_type)
}

/// Drop the custom reflector and clear the default registry (for testing).
pub fn reset_reflector() {
    REFLECTOR.with(|r| *r.borrow_mut() = None);
    REGISTRY.with(|registry| registry.clear());
}
