use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

pub const LINKED_WORLD_PREFIX: &str = "DXL_";
const LINKED_ID_MARKER_PREFIX: &str = ".id_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldRef {
    pub name: String,
    pub uid: Uuid,
    pub folder: Option<PathBuf>,
}

impl WorldRef {
    pub fn new(name: impl Into<String>, uid: Uuid) -> Self {
        Self {
            name: name.into(),
            uid,
            folder: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn data_key(&self) -> String {
        if self.name.starts_with(LINKED_WORLD_PREFIX) {
            let folder = self
                .folder
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.name));
            linked_world_key(&folder).unwrap_or_else(|| self.name.clone())
        } else {
            self.uid.to_string()
        }
    }
}

// A linked world keeps its stable id as the name of an `.id_<...>` marker file.
fn linked_world_key(folder: &Path) -> Option<String> {
    let entries = fs::read_dir(folder).ok()?;
    let mut markers = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(LINKED_ID_MARKER_PREFIX))
        .collect::<Vec<_>>();
    markers.sort();
    markers
        .into_iter()
        .next()
        .map(|name| name[1..].to_lowercase())
}
