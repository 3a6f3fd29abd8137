use std::collections::HashMap;

use uuid::Uuid;

use super::codec::{decode_ingredients, BlobOutcome};
use super::document::Section;
use super::geometry::{reconstruct_bounds, BlockPos, BoundsEncoding};
use super::legacy::decode_legacy_ingredients;
use super::report::{IssueKind, RecordIssue, RecordSection};
use super::resolver::ResolverChain;
use super::types::{
    ActorIdentity, ActorProgress, AgingRecord, Container, HeatedVessel, IngredientBundle,
    SpatialMarker,
};

pub(crate) type RecordResult<T> = Result<Option<T>, RecordIssue>;

/// Bookkeeping for the record currently being rebuilt.
#[derive(Debug)]
pub(crate) struct RecordScope {
    section: RecordSection,
    path: String,
    pub(crate) defaulted_fields: usize,
    pub(crate) degradations: Vec<RecordIssue>,
}

impl RecordScope {
    pub(crate) fn new(section: RecordSection, parent_path: &str, key: &str) -> Self {
        Self {
            section,
            path: format!("{parent_path}.{key}"),
            defaulted_fields: 0,
            degradations: Vec::new(),
        }
    }

    pub(crate) fn issue(&self, kind: IssueKind, message: impl Into<String>) -> RecordIssue {
        RecordIssue {
            section: self.section,
            path: self.path.clone(),
            kind,
            message: message.into(),
        }
    }

    fn degrade(&mut self, kind: IssueKind, message: impl Into<String>) {
        let issue = self.issue(kind, message);
        self.degradations.push(issue);
    }

    fn int_or(&mut self, record: &Section<'_>, key: &str, default: i64) -> i64 {
        record.int(key).unwrap_or_else(|| {
            self.defaulted_fields += 1;
            default
        })
    }

    fn float_or(&mut self, record: &Section<'_>, key: &str, default: f64) -> f64 {
        record.float(key).unwrap_or_else(|| {
            self.defaulted_fields += 1;
            default
        })
    }

    fn bool_or(&mut self, record: &Section<'_>, key: &str, default: bool) -> bool {
        record.bool(key).unwrap_or_else(|| {
            self.defaulted_fields += 1;
            default
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) enum IngredientShape<'a> {
    Inline(Section<'a>),
    Blob(String),
}

impl<'a> IngredientShape<'a> {
    pub(crate) fn classify(record: &Section<'a>, key: &str) -> Option<Self> {
        if let Some(materials) = record.section(key) {
            return Some(IngredientShape::Inline(materials));
        }
        record.string(key).map(IngredientShape::Blob)
    }
}

fn inline_entries<'a>(materials: &Section<'a>) -> impl Iterator<Item = (&'a str, i64)> + 'a {
    let materials = materials.clone();
    let keys = materials.keys().collect::<Vec<_>>();
    keys.into_iter()
        .map(move |key| (key, materials.int(key).unwrap_or(0)))
}

fn bundle_from_shape(
    shape: IngredientShape<'_>,
    processing_time: u32,
    legacy_flag: bool,
    resolvers: &ResolverChain,
    scope: &mut RecordScope,
) -> IngredientBundle {
    match shape {
        IngredientShape::Inline(materials) => {
            let entries = decode_legacy_ingredients(inline_entries(&materials), resolvers);
            if legacy_flag {
                IngredientBundle::legacy(entries, processing_time)
            } else {
                IngredientBundle::new(entries, processing_time)
            }
        }
        IngredientShape::Blob(blob) => match decode_ingredients(&blob, resolvers) {
            BlobOutcome::Decoded(bundle) => bundle,
            BlobOutcome::Corrupt(error) => {
                scope.degrade(
                    IssueKind::CorruptBlob,
                    format!("ingredient blob unreadable, using empty bundle: {error}"),
                );
                IngredientBundle::default()
            }
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngredientLookup {
    bundles: HashMap<String, IngredientBundle>,
}

impl IngredientLookup {
    pub fn insert(&mut self, id: impl Into<String>, bundle: IngredientBundle) {
        self.bundles.insert(id.into(), bundle);
    }

    pub fn get(&self, id: &str) -> Option<&IngredientBundle> {
        self.bundles.get(id)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

pub(crate) fn reconstruct_ingredients(
    record: &Section<'_>,
    resolvers: &ResolverChain,
    scope: &mut RecordScope,
) -> RecordResult<IngredientBundle> {
    let Some(shape) = IngredientShape::classify(record, "mats") else {
        return Err(scope.issue(
            IssueKind::MissingStructure,
            "ingredient record has no 'mats' entry",
        ));
    };
    let processing_time = match shape {
        IngredientShape::Inline(_) => clamp_non_negative(scope.int_or(record, "cookedTime", 0)),
        IngredientShape::Blob(_) => 0,
    };
    Ok(Some(bundle_from_shape(
        shape,
        processing_time,
        true,
        resolvers,
        scope,
    )))
}

pub(crate) fn reconstruct_aging(
    key: &str,
    record: &Section<'_>,
    lookup: &IngredientLookup,
    scope: &mut RecordScope,
) -> RecordResult<AgingRecord> {
    let id = key.trim().parse::<i32>().map_err(|_| {
        scope.issue(
            IssueKind::MalformedStructure,
            format!("aging record id '{key}' is not an integer"),
        )
    })?;

    let ingredients = match record.string("ingId") {
        Some(ingredient_id) => match lookup.get(&ingredient_id) {
            Some(bundle) => bundle.clone(),
            None => {
                scope.degrade(
                    IssueKind::DanglingReference,
                    format!("ingredient id '{ingredient_id}' not found"),
                );
                IngredientBundle::default()
            }
        },
        None => {
            scope.degrade(IssueKind::DanglingReference, "record has no ingredient id");
            IngredientBundle::default()
        }
    };

    Ok(Some(AgingRecord {
        id,
        ingredients,
        quality: clamp_i32(scope.int_or(record, "quality", 0)),
        distill_runs: scope.int_or(record, "distillRuns", 0).clamp(0, u8::MAX as i64) as u8,
        age_time: scope.float_or(record, "ageTime", 0.0) as f32,
        wood: scope.float_or(record, "wood", -1.0) as f32,
        recipe: record.string("recipe"),
        unlabeled: scope.bool_or(record, "unlabeled", false),
        persistent: scope.bool_or(record, "persist", false),
        is_static: scope.bool_or(record, "stat", false),
        last_update: scope.int_or(record, "lastUpdate", 0),
    }))
}

pub(crate) fn actor_identity(key: &str, use_uuid: bool) -> Option<ActorIdentity> {
    match (Uuid::parse_str(key), use_uuid) {
        (Ok(uuid), true) => Some(ActorIdentity::Uuid(uuid)),
        (Err(_), false) => Some(ActorIdentity::Name(key.to_string())),
        _ => None,
    }
}

pub(crate) fn reconstruct_actor(
    key: &str,
    record: &Section<'_>,
    use_uuid: bool,
    scope: &mut RecordScope,
) -> RecordResult<ActorProgress> {
    let Some(identity) = actor_identity(key, use_uuid) else {
        return Ok(None);
    };
    Ok(Some(ActorProgress {
        identity,
        quality: clamp_i32(scope.int_or(record, "quality", 0)),
        exposure: clamp_i32(scope.int_or(record, "drunk", 0)),
        off_world_exposure: clamp_i32(scope.int_or(record, "offDrunk", 0)),
    }))
}

pub(crate) fn reconstruct_vessel(
    record: &Section<'_>,
    resolvers: &ResolverChain,
    scope: &mut RecordScope,
) -> RecordResult<HeatedVessel> {
    let block = required_block(record, "block", scope)?;
    let Some(shape) = IngredientShape::classify(record, "ingredients") else {
        return Err(scope.issue(
            IssueKind::MissingStructure,
            "vessel record has no 'ingredients' entry",
        ));
    };
    let ingredients = bundle_from_shape(shape, 0, false, resolvers, scope);
    Ok(Some(HeatedVessel {
        block,
        ingredients,
        state: clamp_i32(scope.int_or(record, "state", 1)),
    }))
}

pub(crate) fn bounds_encoding<'a>(
    record: &Section<'a>,
    raw: &'a mut RawBounds,
) -> BoundsEncoding<'a> {
    if record.contains("bounds") {
        raw.explicit = record.string("bounds").unwrap_or_default();
        BoundsEncoding::Explicit(&raw.explicit)
    } else if record.contains("st") {
        raw.stairs = record.string("st").unwrap_or_default();
        raw.wood = record.string("wo");
        BoundsEncoding::LegacyPoints {
            stairs: &raw.stairs,
            wood: raw.wood.as_deref(),
        }
    } else {
        BoundsEncoding::Absent
    }
}

#[derive(Debug, Default)]
pub(crate) struct RawBounds {
    explicit: String,
    stairs: String,
    wood: Option<String>,
}

pub(crate) fn reconstruct_container(
    record: &Section<'_>,
    scope: &mut RecordScope,
) -> RecordResult<Container> {
    let spigot = required_block(record, "spigot", scope)?;

    let mut raw = RawBounds::default();
    let encoding = bounds_encoding(record, &mut raw);
    let Some(bounds) = reconstruct_bounds(encoding) else {
        let detail = match encoding {
            BoundsEncoding::Explicit(_) => "explicit bounds are not six integers",
            BoundsEncoding::LegacyPoints { .. } => "legacy boundary points are malformed",
            BoundsEncoding::Absent => "no bounds and no legacy boundary points",
        };
        return Err(scope.issue(IssueKind::NoBounds, detail));
    };

    // Stored as a signed byte by every writer.
    let sign_offset = record.int("sign").map(|value| value as i8);

    Ok(Some(Container {
        spigot,
        sign_offset,
        bounds,
        inventory: record.map("inv").cloned(),
        elapsed: scope.float_or(record, "time", 0.0) as f32,
    }))
}

pub(crate) fn reconstruct_marker(
    key: &str,
    parent: &Section<'_>,
    scope: &mut RecordScope,
) -> RecordResult<SpatialMarker> {
    let Some(raw) = parent.string(key) else {
        return Err(scope.issue(IssueKind::MissingStructure, "marker has no location string"));
    };
    let parts = raw.split('/').map(str::trim).collect::<Vec<_>>();
    let [x, y, z, pitch, yaw] = parts.as_slice() else {
        return Err(scope.issue(
            IssueKind::MalformedStructure,
            format!(
                "marker location '{raw}' has {} components, expected x/y/z/pitch/yaw",
                parts.len()
            ),
        ));
    };
    let malformed = |_| {
        scope.issue(
            IssueKind::MalformedStructure,
            format!("marker location '{raw}' has a non-numeric component"),
        )
    };
    Ok(Some(SpatialMarker {
        x: x.parse::<f64>().map_err(malformed)?,
        y: y.parse::<f64>().map_err(malformed)?,
        z: z.parse::<f64>().map_err(malformed)?,
        pitch: pitch.parse::<f32>().map_err(malformed)?,
        yaw: yaw.parse::<f32>().map_err(malformed)?,
    }))
}

fn required_block(
    record: &Section<'_>,
    key: &str,
    scope: &RecordScope,
) -> Result<BlockPos, RecordIssue> {
    let Some(raw) = record.string(key) else {
        return Err(scope.issue(
            IssueKind::MissingStructure,
            format!("missing block data '{key}'"),
        ));
    };
    BlockPos::parse_slashed(&raw).map_err(|error| {
        scope.issue(
            IssueKind::MalformedStructure,
            format!("incomplete block data '{key}' = '{raw}': {error}"),
        )
    })
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn clamp_non_negative(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}
