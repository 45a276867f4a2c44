use std::sync::Arc;

use snip_core::Shortener;

/// Shared handler state. The shortener type is fixed at startup so handlers
/// are monomorphised over the chosen backend.
pub struct AppState<S> {
    shortener: Arc<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            shortener: Arc::clone(&self.shortener),
        }
    }
}

impl<S: Shortener> AppState<S> {
    pub fn new(shortener: S) -> Self {
        Self {
            shortener: Arc::new(shortener),
        }
    }

    pub fn shortener(&self) -> &S {
        &self.shortener
    }
}
