use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("data file {path} is malformed at line {line}, column {column}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("data file {path} must contain an object at the top level")]
    NotAnObject { path: PathBuf },
}

pub trait DocumentSource {
    fn load(&self, path: &Path) -> Result<DataDocument, DocumentError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentSource;

impl DocumentSource for JsonDocumentSource {
    fn load(&self, path: &Path) -> Result<DataDocument, DocumentError> {
        let raw = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        DataDocument::parse_json(&raw, path)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDocument {
    root: Map<String, Value>,
}

impl DataDocument {
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn parse_json(raw: &str, path: &Path) -> Result<Self, DocumentError> {
        let value = serde_json::from_str::<Value>(raw).map_err(|error| {
            DocumentError::Malformed {
                path: path.to_path_buf(),
                line: error.line(),
                column: error.column(),
                message: error.to_string(),
            }
        })?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(DocumentError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn root(&self) -> Section<'_> {
        Section {
            path: String::new(),
            map: &self.root,
        }
    }

    pub fn section(&self, path: &str) -> Option<Section<'_>> {
        self.root().section(path)
    }

    pub fn string(&self, path: &str) -> Option<String> {
        self.root().string(path)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }
}

#[derive(Debug, Clone)]
pub struct Section<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Section<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.map.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_section(&self, path: &str) -> bool {
        self.get(path).is_some_and(Value::is_object)
    }

    pub fn section(&self, path: &str) -> Option<Section<'a>> {
        let map = self.get(path)?.as_object()?;
        let path = if self.path.is_empty() {
            path.to_string()
        } else {
            format!("{}.{}", self.path, path)
        };
        Some(Section { path, map })
    }

    pub fn map(&self, path: &str) -> Option<&'a Map<String, Value>> {
        self.get(path)?.as_object()
    }

    pub fn string(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn int(&self, path: &str) -> Option<i64> {
        let number = self.get(path)?.as_number()?;
        number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64))
    }

    pub fn float(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    pub fn bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    pub fn int_list(&self, path: &str) -> Option<Vec<i64>> {
        self.get(path)?
            .as_array()?
            .iter()
            .map(Value::as_i64)
            .collect()
    }
}
