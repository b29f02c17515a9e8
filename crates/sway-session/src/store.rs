//! On-disk profiles
//!
//! A profile is two files in the profile directory:
//!
//! - `<prefix><profile>_tree.json`: the window tree at save time
//! - `<prefix><profile>`: the workspace list, outputs rewritten to identifiers
//!
//! Profiles are never modified after they are written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::SessionError;
use crate::tree::{bind_outputs, Output, Tree, Workspace};

/// Suffix of the tree artifact
const TREE_SUFFIX: &str = "_tree.json";

/// Timestamp format of generated profile names; sorts chronologically
const PROFILE_TIMESTAMP_FORMAT: &str = "%Y.%m.%d_%H:%M:%S";

/// Name for a profile saved without an explicit name
pub fn default_profile_name() -> String {
    chrono::Local::now()
        .format(PROFILE_TIMESTAMP_FORMAT)
        .to_string()
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
    prefix: String,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &sway_session_config::GlobalConfig) -> Self {
        Self::new(&config.profile_dir, &config.file_prefix)
    }

    pub fn tree_path(&self, profile: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.prefix, profile, TREE_SUFFIX))
    }

    pub fn mapping_path(&self, profile: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, profile))
    }

    /// Write both artifacts of a profile
    ///
    /// The tree is stored exactly as the compositor reported it; workspace outputs are rewritten to output
    /// identifiers before the workspace list is stored.
    pub fn save(
        &self,
        profile: &str,
        tree: &Tree,
        workspaces: Vec<Workspace>,
        outputs: &[Output],
    ) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).map_err(|source| SessionError::Io {
            path: self.dir.clone(),
            source,
        })?;

        write_json(&self.tree_path(profile), tree)?;
        write_json(&self.mapping_path(profile), &bind_outputs(workspaces, outputs))?;

        debug!(profile, dir = %self.dir.display(), "Profile written");
        Ok(())
    }

    /// Read the saved workspace list of a profile
    ///
    /// An empty list is treated like a missing one.
    pub fn load_mapping(&self, profile: &str) -> Result<Vec<Workspace>, SessionError> {
        let path = self.mapping_path(profile);
        let mapping: Option<Vec<Workspace>> = read_json(&path)?;
        match mapping {
            Some(mapping) if !mapping.is_empty() => Ok(mapping),
            _ => Err(SessionError::MappingNotFound {
                profile: profile.to_string(),
                path,
            }),
        }
    }

    /// Read the saved window tree of a profile
    pub fn load_tree(&self, profile: &str) -> Result<Tree, SessionError> {
        let path = self.tree_path(profile);
        read_json(&path)?.ok_or_else(|| SessionError::TreeNotFound {
            profile: profile.to_string(),
            path,
        })
    }

    /// Read both artifacts of a profile
    pub fn load(&self, profile: &str) -> Result<(Tree, Vec<Workspace>), SessionError> {
        let mapping = self.load_mapping(profile)?;
        let tree = self.load_tree(profile)?;
        Ok((tree, mapping))
    }

    /// Name of the most recently saved profile
    ///
    /// Picks the lexicographically last tree artifact, which is the newest
    /// one as long as profiles carry the default timestamp names.
    pub fn latest_profile(&self) -> Result<String, SessionError> {
        let no_profiles = || SessionError::NoProfiles {
            dir: self.dir.clone(),
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_profiles()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| {
                name.strip_prefix(self.prefix.as_str())
                    .and_then(|rest| rest.strip_suffix(TREE_SUFFIX))
                    .filter(|profile| !profile.is_empty())
                    .map(str::to_string)
            })
            .max()
            .ok_or_else(no_profiles)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SessionError> {
    let io_err = |source: std::io::Error| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec_pretty(value).map_err(|e| io_err(e.into()))?;
    fs::write(path, json).map_err(io_err)
}

/// Deserialize a JSON artifact; `Ok(None)` when the file does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SessionError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| SessionError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProfileStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = ProfileStore::new(dir.path(), "workspace_");
        (dir, store)
    }

    fn tree() -> Tree {
        Tree::from_value(json!({
            "id": 1, "name": "root", "type": "root", "layout": "splith",
            "nodes": [{"id": 2, "name": "DP-1", "type": "output", "nodes": [
                {"id": 3, "name": "1", "type": "workspace", "nodes": [
                    {"id": 4, "name": "untitled", "type": "con", "app_id": null,
                     "shell": "xdg_shell", "nodes": []}
                ]}
            ]}]
        }))
        .unwrap()
    }

    fn outputs() -> Vec<Output> {
        vec![Output {
            name: "DP-1".into(),
            make: "Goldstar".into(),
            model: "LG HDR 4K".into(),
            serial: "0x0000B1D2".into(),
        }]
    }

    fn workspaces() -> Vec<Workspace> {
        vec![Workspace {
            name: "1".into(),
            output: "DP-1".into(),
            visible: true,
        }]
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        store.save("desk", &tree(), workspaces(), &outputs()).unwrap();

        let (loaded_tree, mapping) = store.load("desk").unwrap();

        assert_eq!(loaded_tree, tree());
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].output, "Goldstar LG HDR 4K 0x0000B1D2");
        assert!(mapping[0].visible);
    }

    #[test]
    fn test_artifact_names() {
        let (dir, store) = store();
        store.save("desk", &tree(), workspaces(), &outputs()).unwrap();

        assert!(dir.path().join("workspace_desk_tree.json").is_file());
        assert!(dir.path().join("workspace_desk").is_file());
    }

    #[test]
    fn test_tree_is_written_verbatim() {
        let (dir, store) = store();
        store.save("desk", &tree(), workspaces(), &outputs()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("workspace_desk_tree.json")).unwrap())
                .unwrap();
        assert_eq!(&raw, tree().raw());
        assert_eq!(raw["layout"], json!("splith"));
        let view = &raw["nodes"][0]["nodes"][0]["nodes"][0];
        assert_eq!(view["app_id"], serde_json::Value::Null);
        assert!(view.get("floating_nodes").is_none());

        let (loaded, _) = store.load("desk").unwrap();
        assert!(loaded.root().nodes[0].nodes[0].nodes[0].is_application());
    }

    #[test]
    fn test_missing_tree_is_not_found() {
        let (dir, store) = store();
        store.save("desk", &tree(), workspaces(), &outputs()).unwrap();
        fs::remove_file(dir.path().join("workspace_desk_tree.json")).unwrap();

        let err = store.load("desk").unwrap_err();
        assert!(
            matches!(err, SessionError::TreeNotFound { ref profile, .. } if profile == "desk"),
            "Expected TreeNotFound, got: {:?}",
            err
        );
    }

    #[test]
    fn test_missing_mapping_is_not_found() {
        let (_dir, store) = store();

        let err = store.load_mapping("nope").unwrap_err();
        assert!(matches!(err, SessionError::MappingNotFound { .. }));
    }

    #[test]
    fn test_empty_mapping_is_not_found() {
        let (dir, store) = store();
        fs::write(dir.path().join("workspace_empty"), "[]").unwrap();

        assert!(matches!(
            store.load_mapping("empty"),
            Err(SessionError::MappingNotFound { .. })
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let (dir, store) = store();
        fs::write(dir.path().join("workspace_bad"), b"\x80\x04pickle").unwrap();

        assert!(matches!(
            store.load_mapping("bad"),
            Err(SessionError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_latest_profile_is_chronological() {
        let (dir, store) = store();
        touch(dir.path(), "workspace_2024.01.01_00:00:00_tree.json");
        touch(dir.path(), "workspace_2024.02.01_00:00:00_tree.json");
        touch(dir.path(), "workspace_2024.02.01_00:00:00");
        touch(dir.path(), "unrelated_2099.01.01_00:00:00_tree.json");

        assert_eq!(store.latest_profile().unwrap(), "2024.02.01_00:00:00");
    }

    #[test]
    fn test_latest_profile_strips_exact_affixes() {
        let (dir, store) = store();
        // Names made of prefix/suffix characters must survive intact
        touch(dir.path(), "workspace_sweet_tree.json");

        assert_eq!(store.latest_profile().unwrap(), "sweet");
    }

    #[test]
    fn test_no_profiles() {
        let (dir, store) = store();
        touch(dir.path(), "workspace_desk");

        assert!(matches!(
            store.latest_profile(),
            Err(SessionError::NoProfiles { .. })
        ));

        let missing = ProfileStore::new(dir.path().join("missing"), "workspace_");
        assert!(matches!(
            missing.latest_profile(),
            Err(SessionError::NoProfiles { .. })
        ));
    }

    #[test]
    fn test_unwritable_dir_is_io_error() {
        let (dir, _) = store();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let store = ProfileStore::new(blocker.join("sub"), "workspace_");

        assert!(matches!(
            store.save("desk", &tree(), workspaces(), &outputs()),
            Err(SessionError::Io { .. })
        ));
    }

    #[test]
    fn test_default_profile_name_format() {
        let name = default_profile_name();

        // YYYY.MM.DD_HH:MM:SS
        assert_eq!(name.len(), 19);
        assert_eq!(&name[4..5], ".");
        assert_eq!(&name[10..11], "_");
        assert_eq!(&name[13..14], ":");
    }
}
