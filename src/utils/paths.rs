//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.study-buddy/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Study Buddy directory (~/.study-buddy/)
pub fn study_buddy_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".study-buddy"))
}

/// Get the config file path (~/.study-buddy/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(study_buddy_dir()?.join("config.json"))
}

/// Get the subjects directory (~/.study-buddy/subjects/)
pub fn subjects_dir() -> AppResult<PathBuf> {
    Ok(study_buddy_dir()?.join("subjects"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Study Buddy directory, creating if it doesn't exist
pub fn ensure_study_buddy_dir() -> AppResult<PathBuf> {
    let path = study_buddy_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

/// Get the subjects directory, creating if it doesn't exist
pub fn ensure_subjects_dir() -> AppResult<PathBuf> {
    let path = subjects_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
