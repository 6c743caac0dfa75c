//! On-disk cache for user-pool tokens
//!
//! Lets one CLI invocation sign in and later invocations reuse the refresh
//! token. The file holds credentials, so it is written with owner-only
//! permissions on unix. Paths are used as given; `~` is expanded by the
//! configuration layer.

use archiver_core::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Tokens as persisted between runs
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedTokens {
    pub username: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for CachedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTokens")
            .field("username", &self.username)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Read cached tokens
///
/// # Returns
/// * `Ok(Some(tokens))` - Cache file found and parsed
/// * `Ok(None)` - File doesn't exist, or is unreadable as a token cache
/// * `Err(...)` - File exists but could not be read
pub fn load(path: &Path) -> Result<Option<CachedTokens>> {
    if !path.exists() {
        debug!("Token cache does not exist: {}", path.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read token cache {}: {}", path.display(), e))
    })?;

    match serde_json::from_str::<CachedTokens>(&contents) {
        Ok(tokens) if !tokens.id_token.is_empty() => {
            debug!("Loaded cached tokens for {} from {}", tokens.username, path.display());
            Ok(Some(tokens))
        }
        Ok(_) => {
            warn!("Token cache {} holds an empty ID token, ignoring", path.display());
            Ok(None)
        }
        Err(e) => {
            warn!("Token cache {} is not valid JSON, ignoring: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Write tokens to the cache file, creating parent directories
pub fn store(path: &Path, tokens: &CachedTokens) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(tokens)?;
    fs::write(path, json)?;
    restrict_permissions(path)?;
    debug!("Stored tokens for {} in {}", tokens.username, path.display());
    Ok(())
}

/// Delete the cache file if it exists
pub fn clear(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
