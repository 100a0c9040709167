//! Views - Host view contracts and the reference view pipeline.
//!
//! - [`host`]: the `HostView`/`HostElement` capabilities factories drive,
//!   plus the `ViewRef`/`ChangeDetectorRef` wrappers handed to callers
//! - [`app_view`]: `AppView`, a concrete host view with nested teardown and
//!   signal-backed change detection
//! - [`registry`]: live-view id allocation
//!
//! # Architecture
//!
//! ```text
//! ViewFactory(view_utils, injector, None) → HostView
//! HostView.create(projectable_nodes, root) → HostElement (element_ref, injector, instance)
//! HostElement.parent_view → HostView  (ViewRef / ChangeDetectorRef)
//! ```

mod element_ref;
mod view_utils;
pub mod host;
pub mod app_view;
pub mod registry;

pub use element_ref::{ElementRef, NativeElement};
pub use view_utils::ViewUtils;
pub use host::{ChangeDetectorRef, DestroyCallback, HostElement, HostView, ViewFactory, ViewRef};
pub use app_view::{
    component_builder, erased_builder, AppElement, AppView, BuildContext, CheckHook,
    ComponentBuilder, ViewFlags, ViewKind,
};
pub use registry::{is_live, live_view_count, live_view_count_signal, live_views_of, reset_registry};
