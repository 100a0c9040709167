//! Linker configuration.
//!
//! Decides the behaviors the handle contract leaves open: what a second
//! `destroy()` does and what happens to a destroy callback registered after
//! the component is already gone.

use std::cell::Cell;

/// What a second `destroy()` on the same handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoubleDestroy {
    /// Fail with `LinkerError::UseAfterDestroy`. Nothing is torn down twice.
    #[default]
    Error,
    /// Treat the call as a no-op.
    Ignore,
}

/// What `on_destroy` does once the component is already destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LateDestroyCallback {
    /// Run the callback right away.
    #[default]
    FireImmediately,
    /// Discard the callback.
    Drop,
}

/// Per-thread linker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkerConfig {
    pub double_destroy: DoubleDestroy,
    pub late_on_destroy: LateDestroyCallback,
}

thread_local! {
    static CONFIG: Cell<LinkerConfig> = const {
        Cell::new(LinkerConfig {
            double_destroy: DoubleDestroy::Error,
            late_on_destroy: LateDestroyCallback::FireImmediately,
        })
    };
}

/// Get the active configuration.
pub fn config() -> LinkerConfig {
    CONFIG.with(|c| c.get())
}

/// Replace the active configuration.
pub fn set_config(config: LinkerConfig) {
    CONFIG.with(|c| c.set(config));
}

/// Restore the defaults (for testing).
pub fn reset_config() {
    set_config(LinkerConfig::default());
}
