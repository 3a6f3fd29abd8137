use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use super::document::DataDocument;
use super::version::VERSION_KEY;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to encode migrated data for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write migrated data file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot migrate data version {observed} to {target}: {reason}")]
    Unsupported {
        observed: String,
        target: String,
        reason: String,
    },
}

/// Rewrites an outdated data file in place. The loader re-reads the file afterwards,
/// so implementations must leave the upgraded content on disk.
pub trait Migrator {
    fn migrate(
        &self,
        document: &DataDocument,
        data_file: &Path,
        observed_version: &str,
    ) -> Result<(), MigrationError>;
}

#[derive(Debug, Clone)]
pub struct VersionStampMigrator {
    target_version: String,
}

impl VersionStampMigrator {
    pub fn new(target_version: impl Into<String>) -> Self {
        Self {
            target_version: target_version.into(),
        }
    }
}

impl Migrator for VersionStampMigrator {
    fn migrate(
        &self,
        document: &DataDocument,
        data_file: &Path,
        observed_version: &str,
    ) -> Result<(), MigrationError> {
        if observed_version.trim().is_empty() {
            return Err(MigrationError::Unsupported {
                observed: observed_version.to_string(),
                target: self.target_version.clone(),
                reason: "blank version string".to_string(),
            });
        }
        let mut upgraded = document.clone();
        upgraded.set(VERSION_KEY, Value::String(self.target_version.clone()));
        let text = upgraded
            .to_json_pretty()
            .map_err(|source| MigrationError::Encode {
                path: data_file.to_path_buf(),
                source,
            })?;
        replace_file_contents(data_file, &text).map_err(|source| MigrationError::Write {
            path: data_file.to_path_buf(),
            source,
        })
    }
}

// Write next to the target, then rename over it, so a crash never leaves a half-written store.
fn replace_file_contents(path: &Path, text: &str) -> io::Result<()> {
    let staging = staging_path_for(path);
    fs::write(&staging, text)?;
    if let Err(error) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }
    Ok(())
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("data");
    let staging_name = format!("{file_name}.migrating");
    match path.parent() {
        Some(parent) => parent.join(staging_name),
        None => PathBuf::from(staging_name),
    }
}
