use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or(VaultError::HomeDirNotFound)?;
    Ok(home.join(".nostr-vault"))
}

pub fn escrow_url_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("escrow_url"))
}

pub fn ensure_config_dir() -> anyhow::Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {} directory", dir.display()))?;
    Ok(())
}

/// Write the escrow URL atomically (write to temp then rename).
///
/// The temp file lives in the destination directory so the rename never
/// crosses filesystems.
pub fn write_escrow_url(url: &str, dest: &Path) -> anyhow::Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Config destination path has no parent directory"))?;

    let tmp = parent.join(".escrow_url.tmp");
    std::fs::write(&tmp, format!("{}\n", url.trim())).map_err(VaultError::AtomicWriteFailed)?;

    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(VaultError::AtomicWriteFailed(e).into());
    }

    Ok(())
}

/// Read the saved escrow URL. A missing or blank file means "not configured".
pub fn read_escrow_url(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read escrow URL from {}", path.display()))?;
    let value = content.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(value.to_string()))
}
