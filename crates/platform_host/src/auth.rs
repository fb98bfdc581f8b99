//! Cloud-storage auth-status contracts.
//!
//! The desktop core only needs to know whether a cloud provider has a configured client, whether
//! a session is live, and how to ask for one. Token exchange is the host's business.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::fs::path::path_scheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Cloud storage backends reachable through provider-prefixed paths.
pub enum CloudProvider {
    /// `gdrive:/` paths.
    GoogleDrive,
    /// `dropbox:/` paths.
    Dropbox,
    /// `onedrive:/` paths.
    OneDrive,
}

impl CloudProvider {
    /// Every supported provider, in sidebar order.
    pub const ALL: [CloudProvider; 3] = [Self::Dropbox, Self::GoogleDrive, Self::OneDrive];

    /// Returns the path scheme used by this provider.
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::GoogleDrive => "gdrive",
            Self::Dropbox => "dropbox",
            Self::OneDrive => "onedrive",
        }
    }

    /// Returns the root path of this provider's tree.
    pub const fn root_path(self) -> &'static str {
        match self {
            Self::GoogleDrive => "gdrive:/",
            Self::Dropbox => "dropbox:/",
            Self::OneDrive => "onedrive:/",
        }
    }

    /// Returns the user-facing provider name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::GoogleDrive => "Google Drive",
            Self::Dropbox => "Dropbox",
            Self::OneDrive => "OneDrive",
        }
    }

    /// Resolves the provider serving `path`, if it is a cloud path.
    pub fn from_path(path: &str) -> Option<Self> {
        let scheme = path_scheme(path)?;
        Self::ALL
            .into_iter()
            .find(|provider| provider.scheme() == scheme)
    }
}

/// Object-safe boxed future used by [`AuthStatusProvider`] async methods.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service reporting and establishing cloud sessions.
pub trait AuthStatusProvider {
    /// Returns `true` when a client id is configured for `provider`.
    fn is_configured(&self, provider: CloudProvider) -> bool;

    /// Returns `true` when a session is live for `provider`.
    fn is_connected(&self, provider: CloudProvider) -> bool;

    /// Starts an interactive login for `provider`.
    fn login<'a>(&'a self, provider: CloudProvider) -> AuthFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Auth provider for hosts without cloud support.
pub struct NoopAuthStatusProvider;

impl AuthStatusProvider for NoopAuthStatusProvider {
    fn is_configured(&self, _provider: CloudProvider) -> bool {
        false
    }

    fn is_connected(&self, _provider: CloudProvider) -> bool {
        false
    }

    fn login<'a>(&'a self, provider: CloudProvider) -> AuthFuture<'a, Result<(), String>> {
        Box::pin(async move {
            Err(format!("cloud auth unavailable: {}", provider.display_name()))
        })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory auth provider whose login succeeds unless a denial was registered.
pub struct MemoryAuthStatusProvider {
    configured: Rc<RefCell<HashSet<CloudProvider>>>,
    connected: Rc<RefCell<HashSet<CloudProvider>>>,
    denials: Rc<RefCell<HashMap<CloudProvider, String>>>,
}

impl MemoryAuthStatusProvider {
    /// Marks `provider` as having a configured client id.
    pub fn configure(&self, provider: CloudProvider) {
        self.configured.borrow_mut().insert(provider);
    }

    /// Marks `provider` as already connected.
    pub fn connect(&self, provider: CloudProvider) {
        self.configure(provider);
        self.connected.borrow_mut().insert(provider);
    }

    /// Makes the next logins for `provider` fail with `reason`.
    pub fn deny_login(&self, provider: CloudProvider, reason: impl Into<String>) {
        self.denials.borrow_mut().insert(provider, reason.into());
    }
}

impl AuthStatusProvider for MemoryAuthStatusProvider {
    fn is_configured(&self, provider: CloudProvider) -> bool {
        self.configured.borrow().contains(&provider)
    }

    fn is_connected(&self, provider: CloudProvider) -> bool {
        self.connected.borrow().contains(&provider)
    }

    fn login<'a>(&'a self, provider: CloudProvider) -> AuthFuture<'a, Result<(), String>> {
        Box::pin(async move {
            if let Some(reason) = self.denials.borrow().get(&provider) {
                return Err(reason.clone());
            }
            self.connected.borrow_mut().insert(provider);
            Ok(())
        })
    }
}
