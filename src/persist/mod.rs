//! Snapshot persistence behind a small port, so the editor does not care
//! whether wallets land in a session file, memory, or a real database.

mod autosave;
mod session_file;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::Result;
use crate::wallet::WalletNode;

pub use autosave::Autosave;
pub use session_file::SessionFileStore;

pub trait SnapshotStore {
    /// Overwrites the stored snapshot.
    fn save(&mut self, snapshot: &[WalletNode]) -> Result<()>;

    /// Reads the stored snapshot, `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<Vec<WalletNode>>>;
}

/// In-process key-value store with session-storage semantics.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    key: String,
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: HashMap::new(),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &[WalletNode]) -> Result<()> {
        let encoded = serde_json::to_string(snapshot)?;
        self.entries.insert(self.key.clone(), encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<WalletNode>>> {
        match self.entries.get(&self.key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }
}

/// Reads the stored snapshot once for startup. Any failure is logged and
/// reported as "nothing stored" so the caller keeps its in-memory state.
pub fn restore(store: &dyn SnapshotStore) -> Option<Vec<WalletNode>> {
    match store.load() {
        Ok(Some(nodes)) => {
            info!(wallets = nodes.len(), "restored wallet snapshot");
            Some(nodes)
        }
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "could not restore wallet snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::wallet::WalletGraph;

    #[test]
    fn memory_store_round_trips() {
        let ids = SequentialIds::new("m");
        let mut graph = WalletGraph::with_default_root(&ids);
        let second = graph.add_wallet(&ids);
        let root = graph.nodes()[0].id.clone();
        graph.add_edge(&root, &second).unwrap();

        let mut store = MemoryStore::new("wallets");
        store.save(graph.nodes()).unwrap();
        assert_eq!(restore(&store), Some(graph.into_nodes()));
    }

    #[test]
    fn garbage_and_missing_snapshots_restore_nothing() {
        let mut store = MemoryStore::new("wallets");
        assert!(restore(&store).is_none());

        store.set_raw("wallets", "{not json");
        assert!(store.load().is_err());
        assert!(restore(&store).is_none());
    }

    #[test]
    fn stored_empty_list_is_restored() {
        let mut store = MemoryStore::new("wallets");
        store.set_raw("wallets", "[]");
        assert_eq!(restore(&store), Some(Vec::new()));
    }
}
