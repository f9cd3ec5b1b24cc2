//! Utilities (script file reading and saving).

use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};

/// Read a script file and return its content as string.
/// Supports Groovy sources, plain text and files without extension.
pub fn read_script(file_path: &Path) -> Result<String> {
    // Check if file exists
    if !file_path.exists() {
        bail!("Script file '{}' does not exist", file_path.display());
    }

    // Check if it's a file (not directory)
    if !file_path.is_file() {
        bail!("'{}' is not a file", file_path.display());
    }

    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "groovy" | "gvy" | "gy" | "gsh" | "txt" | "" => fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file '{}'", file_path.display())),
        _ => {
            bail!("Unsupported file type: .{}\nCurrently supported: .groovy, .gvy, .gy, .gsh, .txt, and files without extension", extension);
        }
    }
}

/// Write the editor contents back to disk, creating parent directories.
pub fn save_script(file_path: &Path, code: &str) -> Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(file_path, code)
        .with_context(|| format!("Failed to write file '{}'", file_path.display()))
}
