//! Executor for reducer-emitted runtime effects.
//!
//! Effects run in emission order against the shell's host adapters. Persistence failures are
//! logged and otherwise ignored; navigation failures and notices are handed back to the caller
//! as user-facing messages.

use leptos::logging::warn;

use crate::explorer::fetch_remote_listing;
use crate::persistence::{persist_layout_snapshot, persist_network_drives};
use crate::reducer::{DesktopAction, RuntimeEffect};
use crate::shell::DesktopShell;

/// Runs `effects` in order and returns the notices they produced.
pub async fn run_effects(shell: &mut DesktopShell, effects: Vec<RuntimeEffect>) -> Vec<String> {
    let mut notices = Vec::new();
    for effect in effects {
        if let Some(notice) = run_runtime_effect(shell, effect).await {
            notices.push(notice);
        }
    }
    notices
}

/// Dispatches `action` and drains its effects.
pub async fn dispatch_and_run(shell: &mut DesktopShell, action: DesktopAction) -> Vec<String> {
    let effects = shell.dispatch(action);
    run_effects(shell, effects).await
}

async fn run_runtime_effect(shell: &mut DesktopShell, effect: RuntimeEffect) -> Option<String> {
    let prefs = shell.host().prefs_store();
    match effect {
        RuntimeEffect::PersistLayout => {
            let snapshot = shell.layout_snapshot();
            if let Err(err) = persist_layout_snapshot(prefs.as_ref(), &snapshot).await {
                warn!("desktop layout persist failed: {err}");
            }
            None
        }
        RuntimeEffect::PersistNetworkDrives => {
            if let Err(err) = persist_network_drives(prefs.as_ref(), shell.drives()).await {
                warn!("network drives persist failed: {err}");
            }
            None
        }
        RuntimeEffect::FetchRemoteListing { ticket, login_with } => {
            let content = shell.host().content_provider();
            let auth = shell.host().auth_provider();
            let fetch =
                fetch_remote_listing(content.as_ref(), auth.as_ref(), ticket, login_with).await;
            shell.finish_navigation(fetch).err().map(|err| err.to_string())
        }
        RuntimeEffect::Notice(message) => Some(message),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use platform_host::{
        CloudProvider, ContentEntry, MemoryAuthStatusProvider, MemoryContentProvider,
        MemoryPrefsStore, DESKTOP_LAYOUT_PREFS_KEY, NETWORK_DRIVES_PREFS_KEY,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::apps::AppRegistry;
    use crate::config::DesktopConfig;
    use crate::host::DesktopHostContext;
    use crate::model::AppId;

    fn shell_with(
        content: &MemoryContentProvider,
        auth: &MemoryAuthStatusProvider,
        prefs: &MemoryPrefsStore,
    ) -> DesktopShell {
        DesktopShell::new(
            DesktopConfig::default(),
            AppRegistry::builtin(),
            DesktopHostContext::new(
                Rc::new(content.clone()),
                Rc::new(auth.clone()),
                Rc::new(prefs.clone()),
            ),
        )
    }

    #[test]
    fn persistence_effects_write_prefs() {
        let prefs = MemoryPrefsStore::default();
        let mut shell = shell_with(
            &MemoryContentProvider::default(),
            &MemoryAuthStatusProvider::default(),
            &prefs,
        );

        let notices = block_on(dispatch_and_run(
            &mut shell,
            DesktopAction::LaunchApp {
                app_id: AppId::from("browser"),
            },
        ));
        assert!(notices.is_empty());
        block_on(dispatch_and_run(
            &mut shell,
            DesktopAction::MountDrive {
                name: "Share".to_string(),
                path: "E:/".to_string(),
            },
        ));

        assert_eq!(
            prefs.keys(),
            vec![
                DESKTOP_LAYOUT_PREFS_KEY.to_string(),
                NETWORK_DRIVES_PREFS_KEY.to_string()
            ]
        );
    }

    #[test]
    fn remote_navigation_completes_through_effects() {
        let content = MemoryContentProvider::with_remote_schemes(["gdrive"]);
        content.insert_listing("gdrive:/", vec![ContentEntry::folder("Shared")]);
        let auth = MemoryAuthStatusProvider::default();
        auth.configure(CloudProvider::GoogleDrive);
        let mut shell = shell_with(&content, &auth, &MemoryPrefsStore::default());

        let notices = block_on(dispatch_and_run(
            &mut shell,
            DesktopAction::Navigate {
                path: "gdrive:/".to_string(),
            },
        ));

        assert!(notices.is_empty());
        assert!(!shell.explorer().is_loading());
        assert_eq!(shell.explorer().entries()[0].name, "Shared");
    }

    #[test]
    fn rejected_actions_surface_as_notices() {
        let mut shell = DesktopShell::default();
        let notices = block_on(dispatch_and_run(
            &mut shell,
            DesktopAction::Navigate {
                path: "dropbox:/".to_string(),
            },
        ));

        assert_eq!(
            notices,
            vec!["Dropbox is not configured; opening Settings".to_string()]
        );
    }
}
