use anyhow::{anyhow, Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
    sync::Mutex,
};
use tracing::info;

/// Verifies and enrolls username/password pairs.
pub trait CredentialStore: Send + Sync {
    fn verify(&self, name: &str, secret: &str) -> Result<bool>;
    fn register(&self, name: &str, secret: &str) -> Result<Registration>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
}

/// Flat `{ "username": "password" }` JSON file.
pub struct JsonCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn store(&self, users: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        serde_json::to_writer_pretty(&mut tmp, users).context("serializing users")?;
        tmp.write_all(b"\n")?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("renaming {} -> {}", tmp_path.display(), self.path.display())
        })?;
        Ok(())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn verify(&self, name: &str, secret: &str) -> Result<bool> {
        let users = self.load()?;
        Ok(users.get(name).map_or(false, |stored| stored == secret))
    }

    fn register(&self, name: &str, secret: &str) -> Result<Registration> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("credential write lock poisoned"))?;

        let mut users = self.load()?;
        if users.contains_key(name) {
            return Ok(Registration::AlreadyExists);
        }
        users.insert(name.to_string(), secret.to_string());
        self.store(&users)?;
        info!(user = name, "registered account");
        Ok(Registration::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_register_then_verify() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCredentialStore::new(dir.path().join("users.json"));

        assert!(!store.verify("ana", "pw")?);
        assert_eq!(store.register("ana", "pw")?, Registration::Created);
        assert!(store.verify("ana", "pw")?);
        assert!(!store.verify("ana", "wrong")?);
        assert!(!store.verify("ben", "pw")?);
        Ok(())
    }

    #[test]
    fn test_existing_user_not_overwritten() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonCredentialStore::new(dir.path().join("users.json"));
        store.register("ana", "first")?;
        assert_eq!(store.register("ana", "second")?, Registration::AlreadyExists);
        assert!(store.verify("ana", "first")?);
        Ok(())
    }

    #[test]
    fn test_reads_existing_file_format() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("users.json");
        fs::write(&path, "{\n    \"admin\": \"admin123\"\n}")?;
        let store = JsonCredentialStore::new(&path);
        assert!(store.verify("admin", "admin123")?);

        store.register("ana", "pw")?;
        let written: BTreeMap<String, String> = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written.len(), 2);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("users.json");
        fs::write(&path, "not json")?;
        let store = JsonCredentialStore::new(&path);
        assert!(store.verify("a", "b").is_err());
        Ok(())
    }
}
