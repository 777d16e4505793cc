use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;
use crate::session::Session;

const DEFAULT_KEYRING_SERVICE: &str = "fmg-hub";
const KEYRING_USER: &str = "session";
const SESSION_FILE_NAME: &str = "session.json";

/// Returns the keyring service name.
///
/// Defaults to `"fmg-hub"`. Override via `FMG_KEYRING_SERVICE` env var
/// for testing (e.g., `"fmg-hub-test"`) to avoid touching a real session.
fn keyring_service() -> String {
    std::env::var("FMG_KEYRING_SERVICE").unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string())
}

/// Persists the serialized [`Session`] between runs.
///
/// Keychain first, `~/.fmg/session.json` (mode `0600`) when the keychain is
/// unavailable.
#[derive(Debug, Clone)]
pub struct TokenStore {
    use_keyring: bool,
    file: PathBuf,
}

impl TokenStore {
    /// Keychain-backed store with the default file fallback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the home directory cannot be resolved.
    pub fn new() -> Result<Self, AuthError> {
        Ok(Self {
            use_keyring: true,
            file: default_session_path()?,
        })
    }

    /// Store that only ever touches `path`.
    #[must_use]
    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self {
            use_keyring: false,
            file: path.into(),
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file
    }

    /// Persist `session`. Falls back to the file if the keychain write fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if both keyring and file storage fail.
    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AuthError::TokenStoreError(format!("serialize session: {e}")))?;
        if self.use_keyring {
            match keyring::Entry::new(&keyring_service(), KEYRING_USER) {
                Ok(entry) => match entry.set_password(&json) {
                    Ok(()) => return Ok(()),
                    Err(error) => {
                        tracing::warn!(%error, "keyring store failed; falling back to file");
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "keyring unavailable; falling back to file");
                }
            }
        }
        write_private(&self.file, &json)
    }

    /// Load the persisted session. Priority: keyring → file.
    ///
    /// Unparseable entries are ignored.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        if self.use_keyring
            && let Ok(entry) = keyring::Entry::new(&keyring_service(), KEYRING_USER)
            && let Ok(json) = entry.get_password()
            && let Some(session) = parse(&json)
        {
            return Some(session);
        }
        fs::read_to_string(&self.file)
            .ok()
            .and_then(|json| parse(&json))
    }

    /// Delete the persisted session from keyring and file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the session file cannot be removed.
    pub fn clear(&self) -> Result<(), AuthError> {
        if self.use_keyring
            && let Ok(entry) = keyring::Entry::new(&keyring_service(), KEYRING_USER)
        {
            // Missing entries are fine.
            let _ = entry.delete_credential();
        }
        if self.file.exists() {
            fs::remove_file(&self.file).map_err(|e| {
                AuthError::TokenStoreError(format!("failed to delete {}: {e}", self.file.display()))
            })?;
        }
        Ok(())
    }
}

fn parse(json: &str) -> Option<Session> {
    match serde_json::from_str(json) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!(%error, "ignoring unreadable stored session");
            None
        }
    }
}

fn default_session_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|h| h.join(".fmg").join(SESSION_FILE_NAME))
        .ok_or_else(|| {
            AuthError::TokenStoreError("home directory not found, cannot store session".into())
        })
}

fn write_private(path: &Path, contents: &str) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AuthError::TokenStoreError(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(path, contents)
        .map_err(|e| AuthError::TokenStoreError(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::TokenStoreError(format!("chmod {}: {e}", path.display())))?;
    }

    Ok(())
}
