//! Secret storage using the system keyring.
//!
//! Secrets that are not set in the environment are looked up here, so the
//! Reddit password and hub token do not have to live in a plain-text file:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "inboxbell";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Keyring account name for a configuration key (`REDDIT_PASSWORD` → `reddit_password`).
fn entry_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Stores a secret under the given configuration key.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_secret(name: &str, value: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &entry_key(name))?;
    entry.set_password(value)?;
    debug!("Stored {name} in keyring");
    Ok(())
}

/// Retrieves the secret stored under the given configuration key.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_secret(name: &str) -> CredentialResult<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, &entry_key(name))?;
    match entry.get_password() {
        Ok(secret) => {
            debug!("Resolved {name} from keyring");
            Ok(Some(secret))
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No {name} found in keyring");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes the secret stored under the given configuration key.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_secret(name: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &entry_key(name))?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted {name} from keyring");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No {name} to delete from keyring");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete {name} from keyring: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    // These tests interact with the actual system keyring.
    // Run manually with `cargo test -- --ignored`

    use super::*;

    #[test]
    fn test_entry_key() {
        assert_eq!(entry_key("REDDIT_PASSWORD"), "reddit_password");
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_store_get_delete_secret() {
        let name = "INBOXBELL_TEST_SECRET";

        store_secret(name, "s3cret").unwrap();
        assert_eq!(get_secret(name).unwrap(), Some("s3cret".to_string()));

        delete_secret(name).unwrap();
        assert_eq!(get_secret(name).unwrap(), None);
    }
}
