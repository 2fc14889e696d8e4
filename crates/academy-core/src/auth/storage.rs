//! Durable backends for the persisted session.
//!
//! Every backend holds exactly one value under `SESSION_KEY`.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Key (file stem / keyring account) holding the serialized session
pub const SESSION_KEY: &str = "session";

/// Keyring service name
const KEYRING_SERVICE: &str = "academy";

pub trait SessionStorage: Send + Sync {
    /// The stored payload, or `None` if nothing is stored
    fn read(&self) -> Result<Option<String>>;

    /// Overwrite the stored payload
    fn write(&self, value: &str) -> Result<()>;

    /// Remove the stored payload; succeeds if nothing was stored
    fn remove(&self) -> Result<()>;
}

/// `session.json` in the application data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", SESSION_KEY))
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        Ok(Some(contents))
    }

    fn write(&self, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        std::fs::write(self.path(), value).context("Failed to write session file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// The OS keychain, one entry under the `academy` service.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, SESSION_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for KeyringStorage {
    fn read(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        self.entry()?
            .set_password(value)
            .context("Failed to store session in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a payload already stored
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(value.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

macro_rules! forward_storage {
    ($($wrapper:ident)::+) => {
        impl<S: SessionStorage + ?Sized> SessionStorage for $($wrapper)::+<S> {
            fn read(&self) -> Result<Option<String>> {
                (**self).read()
            }

            fn write(&self, value: &str) -> Result<()> {
                (**self).write(value)
            }

            fn remove(&self) -> Result<()> {
                (**self).remove()
            }
        }
    };
}

forward_storage!(std::sync::Arc);
forward_storage!(Box);
