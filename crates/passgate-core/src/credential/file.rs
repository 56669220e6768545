//! File-backed credential store

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::CredentialStore;
use crate::error::StoreError;

/// Default file name inside the data directory
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// On-disk layout
#[derive(Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct CredentialFile {
    #[serde(default)]
    entries: Vec<StoredCredential>,
}

#[derive(Clone, Serialize, Deserialize, Zeroize)]
struct StoredCredential {
    service: String,
    account: String,
    secret: String,
}

/// Credential store persisted as a JSON file readable only by its owner
///
/// Every operation re-reads the file, so several processes sharing the same
/// path observe each other's writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`. Nothing is touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in `dir` using the default file name
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIALS_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CredentialFile, StoreError> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }
        let contents = Zeroizing::new(fs::read_to_string(&self.path)?);
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, file: &CredentialFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = Zeroizing::new(serde_json::to_string_pretty(file)?);
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = create_private(&tmp_path)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!("Saved credentials to {:?}", self.path);
        Ok(())
    }
}

/// Create `path` readable only by its owner from the first byte on.
///
/// A leftover file is removed first so its mode cannot leak into the new one.
fn create_private(path: &Path) -> io::Result<File> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

impl CredentialStore for FileStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        let file = self.load()?;
        Ok(file
            .entries
            .iter()
            .find(|e| e.service == service && e.account == account)
            .map(|e| Zeroizing::new(e.secret.clone())))
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        match file
            .entries
            .iter_mut()
            .find(|e| e.service == service && e.account == account)
        {
            Some(entry) => {
                entry.secret.zeroize();
                entry.secret = secret.to_string();
            }
            None => file.entries.push(StoredCredential {
                service: service.to_string(),
                account: account.to_string(),
                secret: secret.to_string(),
            }),
        }
        self.save(&file)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }

        let mut file = self.load()?;
        let before = file.entries.len();
        file.entries
            .retain(|e| !(e.service == service && e.account == account));

        if file.entries.len() == before {
            return Ok(());
        }
        self.save(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_delete() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());

        assert!(store.get("svc", "acct").unwrap().is_none());

        store.set("svc", "acct", "1234").unwrap();
        assert_eq!(store.get("svc", "acct").unwrap().unwrap().as_str(), "1234");

        store.set("svc", "acct", "5678").unwrap();
        assert_eq!(store.get("svc", "acct").unwrap().unwrap().as_str(), "5678");

        store.delete("svc", "acct").unwrap();
        assert!(store.get("svc", "acct").unwrap().is_none());
    }

    #[test]
    fn test_delete_without_file() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());

        store.delete("svc", "acct").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested/dir/creds.json"));

        store.set("svc", "acct", "secret").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_shared_between_instances() {
        let temp_dir = tempdir().unwrap();
        let writer = FileStore::in_dir(temp_dir.path());
        let reader = FileStore::in_dir(temp_dir.path());

        writer.set("svc", "acct", "shared").unwrap();
        assert_eq!(reader.get("svc", "acct").unwrap().unwrap().as_str(), "shared");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(
            store.get("svc", "acct"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        store.set("svc", "acct", "secret").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_temp_file_is_private_before_any_write() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("creds.json.tmp");
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let file = create_private(&path).unwrap();
        let mode = file.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(file.metadata().unwrap().len(), 0);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        store.set("svc", "acct", "secret").unwrap();
        store.set("svc", "acct", "again").unwrap();

        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.get("svc", "acct").unwrap().unwrap().as_str(), "again");
    }
}
