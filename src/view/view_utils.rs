//! View utilities shared by every view built for one application.

use std::cell::Cell;

/// Per-application view services, resolved from the injector on `create`.
#[derive(Debug)]
pub struct ViewUtils {
    app_id: String,
    next_render_id: Cell<u64>,
}

impl ViewUtils {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            next_render_id: Cell::new(0),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Allocate a render id unique within this application (`"{app_id}-{n}"`).
    pub fn next_render_id(&self) -> String {
        let n = self.next_render_id.get();
        self.next_render_id.set(n + 1);
        format!("{}-{}", self.app_id, n)
    }
}
