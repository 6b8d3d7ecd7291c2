use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Creates a fresh, empty directory for a single test below the system temp directory
pub fn scratch_dir(test_name: &str) -> Result<PathBuf> {
    let mut dir = std::env::temp_dir();
    dir.push(format!("gtseg-io-{}-{}", std::process::id(), test_name));
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}
