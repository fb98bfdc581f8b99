use crate::apps::AppRegistry;
use crate::model::AppId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartMenuItem {
    pub app_id: AppId,
    pub label: String,
    pub icon_ref: String,
}

/// Launcher entries shown in the start menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartMenu {
    pub items: Vec<StartMenuItem>,
}

impl StartMenu {
    /// Launchable apps whose display name contains `term`, ignoring case. A blank term lists all.
    pub fn filtered(registry: &AppRegistry, term: &str) -> Self {
        let term = term.trim().to_lowercase();
        let items = registry
            .launcher_apps()
            .into_iter()
            .filter(|descriptor| {
                term.is_empty() || descriptor.display_name.to_lowercase().contains(&term)
            })
            .map(|descriptor| StartMenuItem {
                app_id: descriptor.app_id.clone(),
                label: descriptor.display_name.clone(),
                icon_ref: descriptor.icon_ref.clone(),
            })
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn labels(menu: &StartMenu) -> Vec<&str> {
        menu.items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn blank_term_lists_every_launcher_app() {
        let menu = StartMenu::filtered(&AppRegistry::builtin(), "  ");
        assert_eq!(
            labels(&menu),
            vec!["File Explorer", "Browser", "Notepad", "Calculator", "Terminal", "Settings"]
        );
    }

    #[test]
    fn term_matches_display_name_case_insensitively() {
        let registry = AppRegistry::builtin();
        assert_eq!(labels(&StartMenu::filtered(&registry, "NOTE")), vec!["Notepad"]);
        assert!(StartMenu::filtered(&registry, "properties").is_empty());
    }
}
