use crate::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Current local date as YYYYMMDD, the stamp used for output directories.
pub fn current_date_string() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Ensure `<base>/<YYYYMMDD>` exists and return it.
pub fn dated_dir(base: &Path) -> Result<PathBuf> {
    let dir = base.join(current_date_string());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
