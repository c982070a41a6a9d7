//! Inspect or store the Anthropic API key.

use crate::config::Config;
use crate::credentials::{self, CredentialStore, KeySource, API_KEY_ENV, API_KEY_FILE};

pub fn show(config: &Config) -> anyhow::Result<()> {
    let store = CredentialStore::new(config.credentials_dir()?);
    match store.resolve_api_key()? {
        Some((key, KeySource::File)) => println!(
            "api key: {} (from {})",
            credentials::mask(&key),
            store.path(API_KEY_FILE).display()
        ),
        Some((key, KeySource::Environment)) => println!(
            "api key: {} (from ${API_KEY_ENV})",
            credentials::mask(&key)
        ),
        None => {
            println!("api key: not configured");
            println!("Store one with `vivus key set <value>` or export {API_KEY_ENV}.");
        }
    }
    Ok(())
}

pub fn set(config: &Config, value: &str) -> anyhow::Result<()> {
    let value = value.trim();
    anyhow::ensure!(!value.is_empty(), "Refusing to store an empty API key");

    let store = CredentialStore::new(config.credentials_dir()?);
    let path = store.save(API_KEY_FILE, value)?;
    println!("Stored {} at {}", credentials::mask(value), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_writes_into_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_credentials_dir(dir.path());

        set(&config, "  sk-ant-test-12345\n").unwrap();

        let stored = std::fs::read_to_string(dir.path().join(API_KEY_FILE)).unwrap();
        assert_eq!(stored, "sk-ant-test-12345");
    }

    #[test]
    fn empty_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_credentials_dir(dir.path());

        assert!(set(&config, "   ").is_err());
        assert!(!dir.path().join(API_KEY_FILE).exists());
    }
}
