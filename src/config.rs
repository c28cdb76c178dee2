use std::path::PathBuf;
use std::time::Duration;

/// Tunables shared by the editor core and the canvas.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Snapshot file standing in for browser session storage.
    pub session_file: PathBuf,
    /// Key under which the wallet list is stored.
    pub session_key: String,
    /// Quiet period after the last edit before the snapshot is written.
    pub autosave_debounce: Duration,
    /// Skip restoring the stored snapshot on startup.
    pub fresh_start: bool,
    /// Edge length of the square wallet card on the canvas.
    pub node_size: f32,
    /// Offset applied to a cloned wallet's position.
    pub clone_offset: (f32, f32),
    pub address_prefix: String,
    pub address_length: usize,
}

impl EditorConfig {
    pub const DEFAULT_SESSION_KEY: &'static str = "wallets";
    pub const DEFAULT_NODE_SIZE: f32 = 96.0;
    pub const DEFAULT_AUTOSAVE_MS: u64 = 1500;

    pub fn default_session_file() -> PathBuf {
        std::env::temp_dir().join("contract-flow-session.json")
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            session_file: Self::default_session_file(),
            session_key: Self::DEFAULT_SESSION_KEY.to_owned(),
            autosave_debounce: Duration::from_millis(Self::DEFAULT_AUTOSAVE_MS),
            fresh_start: false,
            node_size: Self::DEFAULT_NODE_SIZE,
            clone_offset: (50.0, 50.0),
            address_prefix: "0x".to_owned(),
            address_length: 42,
        }
    }
}
