//! Local license key storage.
//!
//! Client applications persist an activated key so it survives restarts.
//! Lookup order: environment variable, explicit path, default file.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Environment variable for the license key.
pub const LICENSE_ENV_VAR: &str = "QF_LICENSE_KEY";

/// Get the default license file path.
pub fn default_license_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quantumfalcon")
        .join("license")
}

/// Load a license key from all sources (in order of precedence).
///
/// Order:
/// 1. Environment variable `QF_LICENSE_KEY`
/// 2. Explicit path if provided
/// 3. File at `~/.quantumfalcon/license`
///
/// Returns `None` if no key is found anywhere (free tier).
pub fn load_license_key(explicit_path: Option<&Path>) -> Option<String> {
    if let Ok(key) = std::env::var(LICENSE_ENV_VAR) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    if let Some(path) = explicit_path
        && let Some(key) = read_key_file(path)
    {
        return Some(key);
    }

    read_key_file(&default_license_path())
}

/// Read a license key from a file.
fn read_key_file(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let key = content.trim().to_string();
            if key.is_empty() { None } else { Some(key) }
        }
        Err(_) => None,
    }
}

/// Save a license key to the default location.
pub fn save_license_key(key: &str) -> Result<PathBuf> {
    save_license_key_to(key, &default_license_path())
}

/// Save a license key to an explicit path.
pub fn save_license_key_to(key: &str, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, key.trim())?;

    Ok(path.to_path_buf())
}

/// Remove the saved license key.
pub fn remove_license_key() -> Result<()> {
    let path = default_license_path();

    if path.exists() {
        std::fs::remove_file(&path)?;
    }

    Ok(())
}
