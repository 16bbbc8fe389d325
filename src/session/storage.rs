use super::{Session, SESSION_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default session file path (~/.config/psikotes/session.json)
pub fn get_session_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("session.json"))
}

/// Load the saved session.
///
/// A missing file is `Ok(None)`. A file with an unsupported version is an
/// error.
pub fn load_session(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open session file at {}", path.display()))?;

    let session: Session = serde_json::from_reader(file).context("Failed to load session")?;

    if session.version != SESSION_VERSION {
        anyhow::bail!("Unsupported session version: {}", session.version);
    }

    Ok(Some(session))
}

/// Save the session atomically, creating the parent directory if needed.
pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, session).context("Failed to serialize session")?;

    file.commit().context("Failed to save session")?;

    Ok(())
}

/// Remove the saved session. Returns whether one existed.
pub fn clear_session(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("Failed to remove session file at {}", path.display()))?;
    Ok(true)
}
