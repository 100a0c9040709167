//! Element References - Opaque handles to host elements.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Opaque handle to a rendered element.
///
/// The linker never looks inside; renderers and callers downcast the native
/// element to whatever their backend uses.
#[derive(Clone)]
pub struct ElementRef {
    native: Rc<dyn Any>,
}

impl ElementRef {
    pub fn new<T: 'static>(native: T) -> Self {
        Self {
            native: Rc::new(native),
        }
    }

    pub fn from_rc(native: Rc<dyn Any>) -> Self {
        Self { native }
    }

    pub fn native(&self) -> &Rc<dyn Any> {
        &self.native
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.native.downcast_ref::<T>()
    }

    /// Check whether both handles address the same element.
    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        Rc::ptr_eq(&self.native, &other.native)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.downcast_ref::<NativeElement>() {
            Some(native) => write!(f, "ElementRef({native:?})"),
            None => f.write_str("ElementRef(..)"),
        }
    }
}

/// Element produced by the reference view pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeElement {
    /// Bound to an existing location in the document.
    Root { selector: String },
    /// Created without a parent, named after the view's render id.
    Detached { name: String },
}
