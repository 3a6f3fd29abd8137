use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod store;

pub use store::{
    load_config, load_store, ActorIdentity, ActorProgress, AgingRecord, ConfigError, Container,
    DataDocument, DocumentError, DocumentSource, HeatedVessel, Ingredient, IngredientBundle,
    JsonDocumentSource, LoadContext, LoadError, LoadReport, LoadedStore, LoaderConfig,
    MaterialCatalog, MaterialId, MigrationError, Migrator, RecordSection, ResolverChain,
    SpatialMarker, StoreHeader, VersionStampMigrator, WorldData, WorldRef, CURRENT_DATA_VERSION,
};

pub const ROOT_ENV_VAR: &str = "BREWDATA_ROOT";
pub const CONFIG_ENV_VAR: &str = "BREWDATA_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "brewdata.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error(
        "{env_var} is set but does not point to a directory: {path}\n\
Set {env_var} to the folder holding the data file, or unset it to use the current directory."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_data_paths() -> Result<DataPaths, StartupError> {
    let root = match read_env_path(ROOT_ENV_VAR)? {
        Some(root) => {
            let normalized = normalize_path(&root);
            if !normalized.is_dir() {
                return Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                });
            }
            normalized
        }
        None => env::current_dir().map_err(StartupError::CurrentDir)?,
    };
    let config_override = read_env_path(CONFIG_ENV_VAR)?;
    Ok(data_paths_for(root, config_override))
}

fn data_paths_for(root: PathBuf, config_override: Option<PathBuf>) -> DataPaths {
    let config_file = match config_override {
        Some(path) if path.is_absolute() => path,
        Some(path) => root.join(path),
        None => root.join(DEFAULT_CONFIG_FILE),
    };
    DataPaths { root, config_file }
}

fn read_env_path(var: &'static str) -> Result<Option<PathBuf>, StartupError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(PathBuf::from(value))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
