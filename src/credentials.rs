//! API key storage.
//!
//! The agent container bind-mounts the credential directory and its web UI
//! reads `api_key` from it; the launcher owns the host side of that contract.
//! Files are written owner-only (`0600`) and read back trimmed. Resolution
//! prefers the stored file, then the `ANTHROPIC_API_KEY` environment
//! variable.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Environment variable the key can fall back to.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// File name of the stored key inside the credential directory.
pub const API_KEY_FILE: &str = "api_key";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read credential {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Failed to write credential {0}: {1}")]
    Write(String, std::io::Error),
}

/// Where a resolved API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    File,
    Environment,
}

/// Store rooted at the credential directory (`$HOME/.anthropic` by default).
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read a credential file, trimmed. Missing or empty files are `None`.
    pub fn load(&self, name: &str) -> Result<Option<String>, CredentialError> {
        let path = self.path(name);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialError::Read(path.display().to_string(), e)),
        };
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    /// Write a credential file, creating the directory and restricting the
    /// file to its owner.
    pub fn save(&self, name: &str, value: &str) -> Result<PathBuf, CredentialError> {
        let path = self.path(name);
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CredentialError::Write(self.dir.display().to_string(), e))?;
        std::fs::write(&path, value)
            .map_err(|e| CredentialError::Write(path.display().to_string(), e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| CredentialError::Write(path.display().to_string(), e))?;
        }
        tracing::debug!("Saved credential {} to {}", name, path.display());
        Ok(path)
    }

    /// Resolve the API key: stored file first, then `ANTHROPIC_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<Option<(String, KeySource)>, CredentialError> {
        if let Some(key) = self.load(API_KEY_FILE)? {
            return Ok(Some((key, KeySource::File)));
        }
        match std::env::var(API_KEY_ENV) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Some((value.trim().to_string(), KeySource::Environment)))
            }
            _ => Ok(None),
        }
    }
}

/// Mask a key for display: at most the last four characters stay visible.
pub fn mask(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        store.save(API_KEY_FILE, "sk-ant-test-12345\n").unwrap();
        assert_eq!(
            store.load(API_KEY_FILE).unwrap().as_deref(),
            Some("sk-ant-test-12345")
        );
    }

    #[cfg(unix)]
    #[test]
    fn saved_keys_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let path = store.save(API_KEY_FILE, "sk-ant-test-12345").unwrap();

        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_and_empty_files_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        assert_eq!(store.load(API_KEY_FILE).unwrap(), None);

        std::fs::write(store.path(API_KEY_FILE), "  \n").unwrap();
        assert_eq!(store.load(API_KEY_FILE).unwrap(), None);
    }

    #[test]
    fn stored_file_wins_over_the_environment() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save(API_KEY_FILE, "sk-ant-from-file").unwrap();

        let (key, source) = store.resolve_api_key().unwrap().unwrap();
        assert_eq!(key, "sk-ant-from-file");
        assert_eq!(source, KeySource::File);
    }

    #[test]
    fn environment_is_the_fallback() {
        std::env::set_var(API_KEY_ENV, "sk-ant-from-env");

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        let (key, source) = store.resolve_api_key().unwrap().unwrap();
        assert_eq!(key, "sk-ant-from-env");
        assert_eq!(source, KeySource::Environment);
    }

    #[test]
    fn masking_keeps_at_most_four_characters() {
        assert_eq!(mask("sk-ant-REDACTED"), "****alue");
        assert_eq!(mask("short"), "****");
        assert_eq!(mask(""), "****");
    }
}
