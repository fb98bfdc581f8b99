//! Host service bundle consumed by the desktop shell.
//!
//! The shell never talks to storage or cloud backends directly; it goes through the traits in
//! [`platform_host`], bundled here so hosts and tests can swap adapters in one place.

use std::rc::Rc;

use platform_host::{
    AuthStatusProvider, ContentProvider, NoopAuthStatusProvider, NoopContentProvider,
    NoopPrefsStore, PrefsStore,
};

#[derive(Clone)]
/// Host services for listings, cloud auth status, and preference storage.
pub struct DesktopHostContext {
    content: Rc<dyn ContentProvider>,
    auth: Rc<dyn AuthStatusProvider>,
    prefs: Rc<dyn PrefsStore>,
}

impl Default for DesktopHostContext {
    fn default() -> Self {
        Self {
            content: Rc::new(NoopContentProvider),
            auth: Rc::new(NoopAuthStatusProvider),
            prefs: Rc::new(NoopPrefsStore),
        }
    }
}

impl std::fmt::Debug for DesktopHostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopHostContext").finish_non_exhaustive()
    }
}

impl DesktopHostContext {
    pub fn new(
        content: Rc<dyn ContentProvider>,
        auth: Rc<dyn AuthStatusProvider>,
        prefs: Rc<dyn PrefsStore>,
    ) -> Self {
        Self {
            content,
            auth,
            prefs,
        }
    }

    /// Returns the configured listing/content provider.
    pub fn content_provider(&self) -> Rc<dyn ContentProvider> {
        self.content.clone()
    }

    /// Returns the configured cloud auth-status provider.
    pub fn auth_provider(&self) -> Rc<dyn AuthStatusProvider> {
        self.auth.clone()
    }

    /// Returns the configured lightweight preference service.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.prefs.clone()
    }
}
