pub mod apps;
pub mod components;
pub mod config;
pub mod drives;
pub mod effect_executor;
pub mod events;
pub mod explorer;
pub mod host;
pub mod model;
pub mod persistence;
pub mod reducer;
pub mod shell;
pub mod vfs;
pub mod window_manager;

pub use apps::{AppContent, AppDescriptor, AppRegistry};
pub use components::{taskbar_buttons, StartMenu, TaskbarButton};
pub use config::DesktopConfig;
pub use effect_executor::{dispatch_and_run, run_effects};
pub use host::DesktopHostContext;
pub use model::*;
pub use persistence::{
    hydrate_shell, load_layout_snapshot, load_network_drives, persist_layout_snapshot,
    persist_network_drives,
};
pub use reducer::{reduce_desktop, DesktopAction, RuntimeEffect};
pub use shell::{DesktopShell, DragPayload, DropTarget, ShellError};
pub use vfs::{VfsError, VirtualFileSystem};
pub use window_manager::WindowManager;
