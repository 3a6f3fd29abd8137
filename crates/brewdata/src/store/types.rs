use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::geometry::{BlockPos, BoundingBox};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ingredient {
    pub material: MaterialId,
    pub variant: Option<i16>,
    pub amount: u32,
}

impl Ingredient {
    pub fn new(material: MaterialId, amount: u32) -> Self {
        Self {
            material,
            variant: None,
            amount,
        }
    }

    pub fn with_variant(material: MaterialId, variant: i16, amount: u32) -> Self {
        Self {
            material,
            variant: Some(variant),
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientBundle {
    pub entries: Vec<Ingredient>,
    pub processing_time: u32,
    pub legacy: bool,
}

impl IngredientBundle {
    pub fn new(entries: Vec<Ingredient>, processing_time: u32) -> Self {
        Self {
            entries,
            processing_time,
            legacy: false,
        }
    }

    pub fn legacy(entries: Vec<Ingredient>, processing_time: u32) -> Self {
        Self {
            entries,
            processing_time,
            legacy: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sorted_entries(&self) -> Vec<Ingredient> {
        let mut entries = self.entries.clone();
        entries.sort();
        entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgingRecord {
    pub id: i32,
    pub ingredients: IngredientBundle,
    pub quality: i32,
    pub distill_runs: u8,
    pub age_time: f32,
    // `-1.0` when no wood type was ever recorded.
    pub wood: f32,
    pub recipe: Option<String>,
    pub unlabeled: bool,
    pub persistent: bool,
    pub is_static: bool,
    pub last_update: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActorIdentity {
    Uuid(Uuid),
    Name(String),
}

impl fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorIdentity::Uuid(uuid) => write!(f, "{uuid}"),
            ActorIdentity::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorProgress {
    pub identity: ActorIdentity,
    pub quality: i32,
    pub exposure: i32,
    pub off_world_exposure: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatedVessel {
    pub block: BlockPos,
    pub ingredients: IngredientBundle,
    pub state: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub spigot: BlockPos,
    pub sign_offset: Option<i8>,
    pub bounds: BoundingBox,
    pub inventory: Option<Map<String, Value>>,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMarker {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f32,
    pub yaw: f32,
}
