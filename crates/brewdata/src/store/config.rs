use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use super::pipeline::LoadContext;
use super::resolver::{default_renames, MaterialCatalog, ResolverChain};
use super::version::CURRENT_DATA_VERSION;
use super::world::WorldRef;

const DEFAULT_DATA_FILE: &str = "data.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read loader config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse loader config {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub data_file: PathBuf,
    pub current_version: String,
    pub use_uuid: bool,
    pub modern_materials: bool,
    pub materials: Vec<String>,
    pub material_renames: BTreeMap<String, String>,
    pub worlds: Vec<WorldConfig>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            current_version: CURRENT_DATA_VERSION.to_string(),
            use_uuid: true,
            modern_materials: true,
            materials: Vec::new(),
            material_renames: default_renames(),
            worlds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    pub name: String,
    pub uid: Uuid,
    #[serde(default)]
    pub folder: Option<PathBuf>,
}

impl LoaderConfig {
    pub fn data_file_in(&self, root: &Path) -> PathBuf {
        root.join(&self.data_file)
    }

    pub fn world_refs(&self, root: &Path) -> Vec<WorldRef> {
        self.worlds
            .iter()
            .map(|world| {
                let folder = match &world.folder {
                    Some(folder) => root.join(folder),
                    None => root.join(&world.name),
                };
                WorldRef::new(world.name.clone(), world.uid).with_folder(folder)
            })
            .collect()
    }

    pub fn load_context(&self) -> LoadContext {
        let catalog = MaterialCatalog::new(self.materials.iter().map(String::as_str));
        LoadContext {
            resolvers: ResolverChain::standard(
                catalog,
                self.modern_materials,
                self.material_renames.clone(),
            ),
            use_uuid: self.use_uuid,
            current_version: self.current_version.clone(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<LoaderConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(LoaderConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> Result<LoaderConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LoaderConfig>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}
