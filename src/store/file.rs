use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{Store, StoreError};

/// File-backed store: one file per key inside a directory.
///
/// Writes go to a temporary sibling and are renamed into place, so readers
/// see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.value", file_stem(key)))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.tmp", file_stem(key)));
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(write_err)?;
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            write_err(source)
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

/// Map a key onto a portable file name, reversibly.
///
/// ASCII letters, digits, `-` and non-leading `.` are kept; every other
/// byte becomes `_XX` (uppercase hex), so distinct keys never share a file.
fn file_stem(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    let mut stem = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || (byte == b'.' && i > 0);
        if keep {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory_and_overwrites() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join("store"));
        store.set("tagpad.draft", "one").unwrap();
        store.set("tagpad.draft", "two").unwrap();
        assert_eq!(store.get("tagpad.draft").unwrap().as_deref(), Some("two"));
        assert!(store.path_for("tagpad.draft").exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("k", "v").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["k.value".to_string()]);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.remove("never-set").unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_keys_are_encoded_reversibly() {
        assert_eq!(file_stem("a/b\\c d"), "a_2Fb_5Cc_20d");
        assert_eq!(file_stem(".."), "_2E.");
        assert_eq!(file_stem(""), "_");
        assert_eq!(file_stem("tagpad.final-submission"), "tagpad.final-submission");
        assert_ne!(file_stem("a/b"), file_stem("a_b"));
    }

    #[test]
    fn test_similar_keys_do_not_overwrite_each_other() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("lesson/3", "slash").unwrap();
        store.set("lesson_3", "underscore").unwrap();
        store.set("lesson 3", "space").unwrap();
        assert_eq!(store.get("lesson/3").unwrap().as_deref(), Some("slash"));
        assert_eq!(store.get("lesson_3").unwrap().as_deref(), Some("underscore"));
        assert_eq!(store.get("lesson 3").unwrap().as_deref(), Some("space"));
    }

    #[test]
    fn test_unreadable_path_reports_error() {
        let dir = tempdir().unwrap();
        // A directory where the value file should be makes the read fail.
        let store = FileStore::new(dir.path());
        std::fs::create_dir_all(store.path_for("k")).unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::Read { .. })));
    }
}
