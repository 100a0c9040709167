//! Core types for spark-linker.
//!
//! Component identity, metadata and the opaque values that flow between a
//! factory and the view pipeline it drives.

use std::any::{Any, TypeId};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

// =============================================================================
// Component Type
// =============================================================================

/// Stable identifier for a component type.
///
/// Equality is by `TypeId`; the name is only carried for logs and errors.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Identifier for the component type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name (`app::Greeter` -> `Greeter`).
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    /// Check whether this identifies `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl std::hash::Hash for ComponentType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Last path segment of a type name, generic arguments removed
/// (`app::Wrapper<app::Greeter>` -> `Wrapper`).
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.short_name())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// =============================================================================
// Annotation / Metadata
// =============================================================================

/// One opaque metadata entry attached to a component type.
///
/// Callers recover the concrete value with [`Annotation::downcast_ref`].
#[derive(Clone)]
pub struct Annotation(Rc<dyn Any>);

impl Annotation {
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.downcast_ref::<&str>() {
            write!(f, "Annotation({s:?})")
        } else if let Some(s) = self.downcast_ref::<String>() {
            write!(f, "Annotation({s:?})")
        } else {
            f.write_str("Annotation(..)")
        }
    }
}

/// Immutable, shared list of annotations for one component type.
///
/// Cloning shares the underlying list, so a lookup that returns a stored
/// `Metadata` returns that very list ([`Metadata::ptr_eq`]).
#[derive(Clone, Debug)]
pub struct Metadata(Rc<[Annotation]>);

impl Metadata {
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self(annotations.into())
    }

    /// The empty list.
    pub fn empty() -> Self {
        Self(Rc::from(Vec::new()))
    }

    /// Build metadata from plain values, wrapping each in an [`Annotation`].
    pub fn of<T: 'static>(values: impl IntoIterator<Item = T>) -> Self {
        Self::new(values.into_iter().map(Annotation::new).collect())
    }

    /// Check whether both values share the same stored list.
    pub fn ptr_eq(&self, other: &Metadata) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Find the first annotation of type `T`.
    pub fn find<T: 'static>(&self) -> Option<&T> {
        self.0.iter().find_map(|a| a.downcast_ref::<T>())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for Metadata {
    type Target = [Annotation];

    fn deref(&self) -> &[Annotation] {
        &self.0
    }
}

impl From<Vec<Annotation>> for Metadata {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self::new(annotations)
    }
}

/// Ordered `(type, metadata)` pairs. Lookup is a linear scan; first match wins.
pub type MetadataTable = Vec<(ComponentType, Metadata)>;

// =============================================================================
// Projectable Content
// =============================================================================

/// An opaque content node handed to a component for projection.
#[derive(Clone)]
pub struct ContentNode(Rc<dyn Any>);

impl ContentNode {
    pub fn new<T: 'static>(node: T) -> Self {
        Self(Rc::new(node))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentNode(..)")
    }
}

/// Content nodes grouped by slot: outer = slot, inner = nodes in that slot.
pub type ProjectableNodes = Vec<Vec<ContentNode>>;

// =============================================================================
// Root Target
// =============================================================================

/// Where a host element attaches when a host view materializes.
///
/// Absence (`None` at the call site) means a detached host element.
#[derive(Clone, Debug)]
pub enum RootTarget {
    /// Selector of an existing location, e.g. `"#app"`.
    Selector(String),
    /// A pre-existing host element.
    Element(crate::view::ElementRef),
}

impl From<&str> for RootTarget {
    fn from(selector: &str) -> Self {
        RootTarget::Selector(selector.to_string())
    }
}

impl From<String> for RootTarget {
    fn from(selector: String) -> Self {
        RootTarget::Selector(selector)
    }
}

impl From<crate::view::ElementRef> for RootTarget {
    fn from(element: crate::view::ElementRef) -> Self {
        RootTarget::Element(element)
    }
}

// =============================================================================
// Tests
// =============================================================================
