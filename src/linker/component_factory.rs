//! Component Factory - Programmatic component creation.
//!
//! A factory pairs a component type with the view factory the compiler
//! produced for it. `create` drives construction end to end:
//!
//! ```text
//! injector.get(ViewUtils)
//!   → view_factory(view_utils, injector, None)   host view, never declared
//!   → host_view.create(projectable_nodes, root)   host element + instance
//!   → ComponentRef(host_element, type, metadata)
//! ```
//!
//! Factories are immutable and reusable; every `create` builds an
//! independent instance and subtree.

use std::fmt;
use std::rc::Rc;

use crate::di::{Injector, InjectorExt};
use crate::error::Result;
use crate::reflection;
use crate::types::{ComponentType, Metadata, MetadataTable, ProjectableNodes, RootTarget};
use crate::view::{ViewFactory, ViewUtils};
use super::component_ref::ComponentRef;

#[derive(Clone)]
pub struct ComponentFactory {
    selector: String,
    view_factory: ViewFactory,
    component_type: ComponentType,
    metadata_table: Option<Rc<MetadataTable>>,
}

impl ComponentFactory {
    /// Create a factory.
    ///
    /// Without a `metadata_table`, metadata comes from the global reflector.
    pub fn new(
        selector: impl Into<String>,
        view_factory: ViewFactory,
        component_type: ComponentType,
        metadata_table: Option<MetadataTable>,
    ) -> Self {
        Self {
            selector: selector.into(),
            view_factory,
            component_type,
            metadata_table: metadata_table.map(Rc::new),
        }
    }

    /// A factory sharing `original`'s selector, view factory and component
    /// type, with `metadata` as its only metadata entry.
    pub fn clone_with_metadata(original: &ComponentFactory, metadata: Metadata) -> Self {
        tracing::debug!(component = %original.component_type, "cloning factory with new metadata");
        Self {
            selector: original.selector.clone(),
            view_factory: original.view_factory.clone(),
            component_type: original.component_type,
            metadata_table: Some(Rc::new(vec![(original.component_type, metadata)])),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn view_factory(&self) -> &ViewFactory {
        &self.view_factory
    }

    /// Metadata for this factory's component type.
    ///
    /// With a table: the first entry for the type, or empty if there is none.
    /// Without one: whatever the reflector has for the type.
    pub fn metadata(&self) -> Metadata {
        match &self.metadata_table {
            Some(table) => {
                let found = table
                    .iter()
                    .find(|(ty, _)| *ty == self.component_type)
                    .map(|(_, metadata)| metadata.clone());
                tracing::trace!(
                    component = %self.component_type,
                    found = found.is_some(),
                    "metadata from table"
                );
                found.unwrap_or_default()
            }
            None => {
                tracing::trace!(component = %self.component_type, "metadata from reflector");
                reflection::annotations_for(&self.component_type)
            }
        }
    }

    /// Create a new component instance with a detached host element and no
    /// projected content.
    pub fn create(&self, injector: Rc<dyn Injector>) -> Result<ComponentRef> {
        self.create_with(injector, Vec::new(), None)
    }

    /// Create a new component instance.
    ///
    /// Fails if `injector` can't provide [`ViewUtils`]; view-factory and
    /// materialization failures are returned as they are.
    pub fn create_with(
        &self,
        injector: Rc<dyn Injector>,
        projectable_nodes: ProjectableNodes,
        root: Option<RootTarget>,
    ) -> Result<ComponentRef> {
        let view_utils = injector.get_as::<ViewUtils>()?;

        let host_view = (self.view_factory)(view_utils, injector, None)?;
        let host_element = host_view.create(projectable_nodes, root)?;

        tracing::debug!(
            component = %self.component_type,
            selector = %self.selector,
            "component created"
        );
        Ok(ComponentRef::new(
            host_element,
            self.component_type,
            self.metadata(),
        ))
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("selector", &self.selector)
            .field("component_type", &self.component_type)
            .field("has_metadata_table", &self.metadata_table.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
