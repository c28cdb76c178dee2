use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::wallet::WalletNode;

use super::SnapshotStore;

/// JSON file laid out like browser session storage: an object of string
/// values, each a JSON document. Only `key` is ever written; other entries
/// such as `user` or `contracts` are carried over untouched.
#[derive(Clone, Debug)]
pub struct SessionFileStore {
    path: PathBuf,
    key: String,
}

impl SessionFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Option<Map<String, Value>>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::SessionRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(entries) => Ok(Some(entries)),
            _ => Err(Error::SessionShape {
                path: self.path.clone(),
            }),
        }
    }
}

impl SnapshotStore for SessionFileStore {
    fn save(&mut self, snapshot: &[WalletNode]) -> Result<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries.unwrap_or_default(),
            Err(error) => {
                debug!(%error, "replacing unreadable session file");
                Map::new()
            }
        };
        entries.insert(
            self.key.clone(),
            Value::String(serde_json::to_string(snapshot)?),
        );

        let encoded = serde_json::to_string_pretty(&Value::Object(entries))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|source| Error::SessionWrite {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| Error::SessionWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), wallets = snapshot.len(), "wrote session snapshot");
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<WalletNode>>> {
        let Some(entries) = self.read_entries()? else {
            return Ok(None);
        };

        match entries.get(&self.key) {
            Some(Value::String(raw)) => Ok(Some(serde_json::from_str(raw)?)),
            Some(other) => Ok(Some(serde_json::from_value(other.clone())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::wallet::WalletGraph;

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionFileStore::new(dir.path().join("session.json"), "wallets");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_keeps_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"user": "{\"name\":\"ana\"}"}"#).unwrap();

        let ids = SequentialIds::new("f");
        let graph = WalletGraph::with_default_root(&ids);
        let mut store = SessionFileStore::new(&path, "wallets");
        store.save(graph.nodes()).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["user"], r#"{"name":"ana"}"#);
        assert!(raw["wallets"].is_string());
        assert_eq!(store.load().unwrap(), Some(graph.into_nodes()));
    }

    #[test]
    fn later_saves_overwrite_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let ids = SequentialIds::new("o");
        let mut graph = WalletGraph::with_default_root(&ids);
        let mut store = SessionFileStore::new(dir.path().join("session.json"), "wallets");

        store.save(graph.nodes()).unwrap();
        graph.add_wallet(&ids);
        store.save(graph.nodes()).unwrap();

        assert_eq!(store.load().unwrap().map(|nodes| nodes.len()), Some(2));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"wallets": "[{\"id\": 3}]"}"#).unwrap();

        let store = SessionFileStore::new(&path, "wallets");
        assert!(matches!(store.load(), Err(Error::SnapshotDecode(_))));
    }
}
