//! Session key storage
//!
//! The session key authenticates every API request. It is stored in the
//! system keyring under the service name "projsync", with the canonical
//! project root as the username, so each project can use its own account.
//! The `PROJSYNC_SESSION_KEY` environment variable takes precedence.

use anyhow::{Context, Result};
use tracing::debug;

/// Keyring service name
const KEYRING_SERVICE: &str = "projsync";

/// Environment variable that overrides the stored session key
pub const SESSION_KEY_ENV: &str = "PROJSYNC_SESSION_KEY";

/// Stores and retrieves session keys from the system keyring
///
/// Uses the `keyring` crate to keep keys in the OS credential store
/// (e.g., GNOME Keyring, KDE Wallet, macOS Keychain).
pub struct KeyringSessionStorage;

impl KeyringSessionStorage {
    /// Stores a session key for the given project
    ///
    /// # Arguments
    /// * `account` - Canonical project root (used as keyring username)
    /// * `session_key` - The key to store
    pub fn store(account: &str, session_key: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(session_key)
            .context("Failed to store session key in keyring")?;
        debug!(account, "Stored session key in keyring");
        Ok(())
    }

    /// Loads the session key for the given project
    ///
    /// # Returns
    /// `Some(key)` if found, `None` if no key is stored
    pub fn load(account: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, account)
            .context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(key) => {
                debug!(account, "Loaded session key from keyring");
                Ok(Some(key))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(account, "No session key found in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }
}

/// Where a resolved session key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Environment,
    Keyring,
}

impl std::fmt::Display for SessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionSource::Environment => write!(f, "environment ({SESSION_KEY_ENV})"),
            SessionSource::Keyring => write!(f, "keyring"),
        }
    }
}

/// Resolves the session key for a project: environment first, then keyring
pub fn resolve_session_key(account: &str) -> Result<Option<(String, SessionSource)>> {
    if let Some(key) = non_empty(std::env::var(SESSION_KEY_ENV).ok()) {
        debug!("Using session key from environment");
        return Ok(Some((key, SessionSource::Environment)));
    }
    Ok(KeyringSessionStorage::load(account)?
        .and_then(|key| non_empty(Some(key)))
        .map(|key| (key, SessionSource::Keyring)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
