//! Server state: one editor session plus the active settings

use crate::config::Settings;
use crate::session::EditorSession;
use std::path::PathBuf;

pub struct ServerState {
    pub session: EditorSession,
    pub settings: Settings,
    /// Where `UpdateSettings` persists changes; `None` keeps them in memory
    pub settings_path: Option<PathBuf>,
}

impl ServerState {
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            session: EditorSession::new(settings.view_config()),
            settings,
            settings_path,
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(Settings::default(), None)
    }
}
