//! # spark-linker
//!
//! Dynamic component creation for spark reactive UIs.
//!
//! Templates declare most components, but some are created from code: dialogs,
//! toasts, plugin panels. A [`ComponentFactory`] builds such a component and
//! its host view from an injector; the returned [`ComponentRef`] owns it until
//! `destroy()`.
//!
//! ## Architecture
//!
//! ```text
//! ComponentFactory.create(injector, projectable_nodes, root)
//!   → injector.get(ViewUtils)
//!   → view_factory(view_utils, injector, None) → HostView
//!   → HostView.create(projectable_nodes, root)  → HostElement
//!   → ComponentRef(host_element, component_type, metadata)
//! ```
//!
//! The view pipeline, the injector and the reflector are collaborators behind
//! traits. [`view::AppView`] is a reference host view with nested teardown and
//! signal-backed change detection.
//!
//! ## Modules
//!
//! - [`types`] - Component types, metadata, projectable content, root targets
//! - [`linker`] - `ComponentFactory` and `ComponentRef`
//! - [`view`] - Host view contracts, `AppView`, live-view registry
//! - [`di`] - `Injector` seam and `StaticInjector`
//! - [`reflection`] - Metadata fallback for factories without a table
//! - [`config`] - Double-destroy and late-callback behavior

pub mod config;
pub mod di;
pub mod error;
pub mod linker;
pub mod reflection;
pub mod types;
pub mod view;

// Re-export commonly used items
pub use types::*;

pub use error::{LinkerError, Result};

pub use config::{config, reset_config, set_config, DoubleDestroy, LateDestroyCallback, LinkerConfig};

pub use di::{Injector, InjectorExt, StaticInjector, Token};

pub use reflection::{
    annotations_for, register_annotations, reset_reflector, set_reflector, AnnotationRegistry,
    Reflector,
};

pub use linker::{ComponentFactory, ComponentRef};

pub use view::{
    component_builder, erased_builder, AppElement, AppView, BuildContext, ChangeDetectorRef,
    ComponentBuilder, DestroyCallback, ElementRef, HostElement, HostView, NativeElement,
    ViewFactory, ViewFlags, ViewKind, ViewRef, ViewUtils,
};
