use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::document::{DataDocument, DocumentError, DocumentSource, Section};
use super::migration::{MigrationError, Migrator};
use super::records::{
    reconstruct_actor, reconstruct_aging, reconstruct_container, reconstruct_ingredients,
    reconstruct_marker, reconstruct_vessel, IngredientLookup, RecordResult, RecordScope,
};
use super::report::{IssueKind, LoadReport, RecordSection};
use super::resolver::ResolverChain;
use super::types::{ActorProgress, AgingRecord, Container, HeatedVessel, SpatialMarker};
use super::version::{check_data_version, VersionCheck};
use super::world::WorldRef;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[derive(Debug)]
pub struct LoadContext {
    pub resolvers: ResolverChain,
    pub use_uuid: bool,
    pub current_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreHeader {
    pub install_time: i64,
    pub mc_barrel_time: i64,
    pub previous_seeds: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldData {
    pub vessels: Vec<HeatedVessel>,
    pub containers: Vec<Container>,
    pub markers: Vec<SpatialMarker>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedStore {
    pub header: StoreHeader,
    pub aging_records: Vec<AgingRecord>,
    pub actors: Vec<ActorProgress>,
    pub worlds: BTreeMap<String, WorldData>,
    pub report: LoadReport,
}

/// Runs one full load pass: version gate, optional migration and re-read, then
/// every record section in dependency order. Store-level failures end up on
/// [`LoadReport`] and never reach the caller.
pub fn load_store(
    data_file: &Path,
    worlds: &[WorldRef],
    context: &LoadContext,
    source: &dyn DocumentSource,
    migrator: &dyn Migrator,
) -> LoadedStore {
    let mut report = LoadReport::new(data_file.to_path_buf());
    if !data_file.is_file() {
        error!(
            data_file = %data_file.display(),
            "data_file_missing"
        );
        report.data_file_missing = true;
        return LoadedStore {
            report,
            ..LoadedStore::default()
        };
    }

    let mut document = match source.load(data_file) {
        Ok(document) => document,
        Err(error) => return unreadable_store(report, error.into()),
    };
    match check_data_version(&document, &context.current_version) {
        VersionCheck::Unversioned => {
            debug!(data_file = %data_file.display(), "data_version_absent");
        }
        VersionCheck::Current => {
            report.observed_version = Some(context.current_version.clone());
        }
        VersionCheck::Outdated { observed } => {
            info!(
                data_file = %data_file.display(),
                observed_version = %observed,
                target_version = %context.current_version,
                "data_version_migrating"
            );
            report.observed_version = Some(observed.clone());
            match migrator.migrate(&document, data_file, &observed) {
                Ok(()) => {
                    document = match source.load(data_file) {
                        Ok(document) => document,
                        Err(error) => return unreadable_store(report, error.into()),
                    };
                    info!(
                        data_file = %data_file.display(),
                        target_version = %context.current_version,
                        "data_version_migrated"
                    );
                    report.migrated = true;
                }
                Err(error) => {
                    let error = LoadError::from(error);
                    // Records are read from the unmigrated tree.
                    error!(
                        data_file = %data_file.display(),
                        observed_version = %observed,
                        error = %error,
                        "data_version_migration_failed"
                    );
                    report.migration_failed = true;
                    report.store_error = Some(error.to_string());
                }
            }
        }
    }

    let header = read_header(&document);
    let lookup = load_ingredient_lookup(&document, context, &mut report);
    let aging_records = load_aging_records(&document, &lookup, &mut report);
    let actors = load_actors(&document, context, &mut report);

    let mut loaded_worlds = BTreeMap::<String, WorldData>::new();
    for world in worlds {
        let key = world.data_key();
        let data = load_world_data(&document, &key, context, &mut report);
        debug!(
            world = %world.name,
            world_key = %key,
            vessels = data.vessels.len(),
            containers = data.containers.len(),
            markers = data.markers.len(),
            "world_data_loaded"
        );
        loaded_worlds.insert(key, data);
    }

    log_report(&report);
    LoadedStore {
        header,
        aging_records,
        actors,
        worlds: loaded_worlds,
        report,
    }
}

fn unreadable_store(mut report: LoadReport, error: LoadError) -> LoadedStore {
    error!(
        data_file = %report.data_file.display(),
        error = %error,
        "data_file_unreadable"
    );
    report.data_file_unreadable = true;
    report.store_error = Some(error.to_string());
    log_report(&report);
    LoadedStore {
        report,
        ..LoadedStore::default()
    }
}

fn read_header(document: &DataDocument) -> StoreHeader {
    let root = document.root();
    StoreHeader {
        install_time: root.int("installTime").unwrap_or_else(now_millis),
        mc_barrel_time: root.int("MCBarrelTime").unwrap_or(0),
        previous_seeds: root.int_list("prevSeeds").unwrap_or_default(),
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn load_ingredient_lookup(
    document: &DataDocument,
    context: &LoadContext,
    report: &mut LoadReport,
) -> IngredientLookup {
    let mut lookup = IngredientLookup::default();
    let Some(section) = document.section(RecordSection::Ingredients.store_key()) else {
        return lookup;
    };
    for key in section.keys() {
        let outcome = with_record(
            &section,
            key,
            RecordSection::Ingredients,
            report,
            |record, scope| reconstruct_ingredients(record, &context.resolvers, scope),
        );
        if let Some(bundle) = outcome {
            lookup.insert(key, bundle);
        }
    }
    lookup
}

fn load_aging_records(
    document: &DataDocument,
    lookup: &IngredientLookup,
    report: &mut LoadReport,
) -> Vec<AgingRecord> {
    let Some(section) = document.section(RecordSection::Aging.store_key()) else {
        return Vec::new();
    };
    section
        .keys()
        .filter_map(|key| {
            with_record(&section, key, RecordSection::Aging, report, |record, scope| {
                reconstruct_aging(key, record, lookup, scope)
            })
        })
        .collect()
}

fn load_actors(
    document: &DataDocument,
    context: &LoadContext,
    report: &mut LoadReport,
) -> Vec<ActorProgress> {
    let Some(section) = document.section(RecordSection::Actors.store_key()) else {
        return Vec::new();
    };
    section
        .keys()
        .filter_map(|key| {
            with_record(&section, key, RecordSection::Actors, report, |record, scope| {
                reconstruct_actor(key, record, context.use_uuid, scope)
            })
        })
        .collect()
}

fn load_world_data(
    document: &DataDocument,
    world_key: &str,
    context: &LoadContext,
    report: &mut LoadReport,
) -> WorldData {
    let mut data = WorldData::default();

    if let Some(section) = world_section(document, RecordSection::Vessels, world_key) {
        data.vessels = section
            .keys()
            .filter_map(|key| {
                with_record(&section, key, RecordSection::Vessels, report, |record, scope| {
                    reconstruct_vessel(record, &context.resolvers, scope)
                })
            })
            .collect();
    }

    if let Some(section) = world_section(document, RecordSection::Containers, world_key) {
        data.containers = section
            .keys()
            .filter_map(|key| {
                with_record(&section, key, RecordSection::Containers, report, |record, scope| {
                    reconstruct_container(record, scope)
                })
            })
            .collect();
    }

    // Markers are plain strings, so they are read from the parent section.
    if let Some(section) = world_section(document, RecordSection::Markers, world_key) {
        data.markers = section
            .keys()
            .filter_map(|key| {
                let mut scope = RecordScope::new(RecordSection::Markers, section.path(), key);
                let result = reconstruct_marker(key, &section, &mut scope);
                absorb(report, RecordSection::Markers, scope, result)
            })
            .collect();
    }

    data
}

fn world_section<'a>(
    document: &'a DataDocument,
    kind: RecordSection,
    world_key: &str,
) -> Option<Section<'a>> {
    document
        .section(kind.store_key())?
        .section(world_key)
}

fn with_record<T>(
    parent: &Section<'_>,
    key: &str,
    kind: RecordSection,
    report: &mut LoadReport,
    reconstruct: impl FnOnce(&Section<'_>, &mut RecordScope) -> RecordResult<T>,
) -> Option<T> {
    let mut scope = RecordScope::new(kind, parent.path(), key);
    let result = match parent.section(key) {
        Some(record) => reconstruct(&record, &mut scope),
        None => Err(scope.issue(IssueKind::MissingStructure, "record is not a section")),
    };
    absorb(report, kind, scope, result)
}

fn absorb<T>(
    report: &mut LoadReport,
    kind: RecordSection,
    scope: RecordScope,
    result: RecordResult<T>,
) -> Option<T> {
    let tally = report.tally_mut(kind);
    tally.defaulted_fields += scope.defaulted_fields;
    let value = match result {
        Ok(Some(value)) => {
            tally.loaded += 1;
            if !scope.degradations.is_empty() {
                tally.degraded += 1;
            }
            Some(value)
        }
        Ok(None) => {
            tally.filtered += 1;
            None
        }
        Err(issue) => {
            tally.skipped += 1;
            report.issues.push(issue);
            None
        }
    };
    report.issues.extend(scope.degradations);
    value
}

fn log_report(report: &LoadReport) {
    for issue in &report.issues {
        if issue.kind.skips_record() {
            error!(
                section = issue.section.label(),
                path = %issue.path,
                kind = ?issue.kind,
                message = %issue.message,
                "record_skipped"
            );
        } else {
            warn!(
                section = issue.section.label(),
                path = %issue.path,
                kind = ?issue.kind,
                message = %issue.message,
                "record_degraded"
            );
        }
    }
    for section in RecordSection::ALL {
        let tally = report.tally(section);
        debug!(
            section = section.label(),
            loaded = tally.loaded,
            skipped = tally.skipped,
            filtered = tally.filtered,
            degraded = tally.degraded,
            defaulted_fields = tally.defaulted_fields,
            "load_section_summary"
        );
    }
    info!(
        data_file = %report.data_file.display(),
        migrated = report.migrated,
        migration_failed = report.migration_failed,
        unreadable = report.data_file_unreadable,
        loaded = report.total_loaded(),
        skipped = report.total_skipped(),
        issues = report.issues.len(),
        "load_pass_summary"
    );
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;
    use crate::store::document::JsonDocumentSource;
    use crate::store::migration::VersionStampMigrator;
    use crate::store::resolver::{default_renames, MaterialCatalog};
    use crate::store::version::CURRENT_DATA_VERSION;

    #[derive(Default)]
    struct CountingSource {
        loads: Cell<usize>,
    }

    impl DocumentSource for CountingSource {
        fn load(&self, path: &Path) -> Result<DataDocument, DocumentError> {
            self.loads.set(self.loads.get() + 1);
            JsonDocumentSource.load(path)
        }
    }

    struct CountingMigrator {
        inner: VersionStampMigrator,
        runs: Cell<usize>,
    }

    impl CountingMigrator {
        fn new() -> Self {
            Self {
                inner: VersionStampMigrator::new(CURRENT_DATA_VERSION),
                runs: Cell::new(0),
            }
        }
    }

    impl Migrator for CountingMigrator {
        fn migrate(
            &self,
            document: &DataDocument,
            data_file: &Path,
            observed_version: &str,
        ) -> Result<(), MigrationError> {
            self.runs.set(self.runs.get() + 1);
            self.inner.migrate(document, data_file, observed_version)
        }
    }

    fn context() -> LoadContext {
        LoadContext {
            resolvers: ResolverChain::standard(
                MaterialCatalog::new(["WHEAT", "GRASS", "SUGAR"]),
                true,
                default_renames(),
            ),
            use_uuid: true,
            current_version: CURRENT_DATA_VERSION.to_string(),
        }
    }

    fn write_store(temp: &TempDir, value: serde_json::Value) -> std::path::PathBuf {
        let path = temp.path().join("data.json");
        fs::write(&path, serde_json::to_string_pretty(&value).expect("json")).expect("write");
        path
    }

    #[test]
    fn missing_data_file_yields_empty_store() {
        let temp = TempDir::new().expect("temp");
        let source = CountingSource::default();
        let migrator = CountingMigrator::new();
        let loaded = load_store(
            &temp.path().join("data.json"),
            &[],
            &context(),
            &source,
            &migrator,
        );
        assert!(loaded.report.data_file_missing);
        assert!(loaded.aging_records.is_empty());
        assert_eq!(source.loads.get(), 0);
        assert_eq!(migrator.runs.get(), 0);
    }

    #[test]
    fn unversioned_store_loads_without_migration() {
        let temp = TempDir::new().expect("temp");
        let path = write_store(&temp, json!({ "Brew": {} }));
        let source = CountingSource::default();
        let migrator = CountingMigrator::new();
        let loaded = load_store(&path, &[], &context(), &source, &migrator);
        assert_eq!(migrator.runs.get(), 0);
        assert_eq!(source.loads.get(), 1);
        assert!(!loaded.report.migrated);
        assert_eq!(loaded.report.observed_version, None);
    }

    #[test]
    fn outdated_store_migrates_once_and_rereads() {
        let temp = TempDir::new().expect("temp");
        let path = write_store(
            &temp,
            json!({
                "Version": "1.0",
                "Brew": { "4": { "quality": 8 } }
            }),
        );
        let source = CountingSource::default();
        let migrator = CountingMigrator::new();
        let loaded = load_store(&path, &[], &context(), &source, &migrator);

        assert_eq!(migrator.runs.get(), 1);
        assert_eq!(source.loads.get(), 2);
        assert!(loaded.report.migrated);
        assert_eq!(loaded.report.observed_version.as_deref(), Some("1.0"));
        assert_eq!(loaded.aging_records.len(), 1);

        let reread = JsonDocumentSource.load(&path).expect("reread");
        assert_eq!(reread.string("Version").as_deref(), Some(CURRENT_DATA_VERSION));
    }

    #[test]
    fn failed_migration_keeps_loading_the_unmigrated_tree() {
        let temp = TempDir::new().expect("temp");
        let path = write_store(
            &temp,
            json!({ "Version": " ", "Brew": { "2": { "quality": 5 } } }),
        );
        let source = CountingSource::default();
        let migrator = CountingMigrator::new();
        let loaded = load_store(&path, &[], &context(), &source, &migrator);

        assert_eq!(migrator.runs.get(), 1);
        assert_eq!(source.loads.get(), 1);
        assert!(loaded.report.migration_failed);
        assert!(!loaded.report.migrated);
        assert!(loaded
            .report
            .store_error
            .as_deref()
            .is_some_and(|message| message.contains("blank version")));
        assert_eq!(loaded.aging_records.len(), 1);
    }

    #[test]
    fn malformed_data_file_is_absorbed_into_the_report() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("data.json");
        fs::write(&path, r#"{ "Brew": { "1": "#).expect("write");
        let source = CountingSource::default();
        let migrator = CountingMigrator::new();
        let loaded = load_store(&path, &[], &context(), &source, &migrator);

        assert!(loaded.report.data_file_unreadable);
        assert!(!loaded.report.data_file_missing);
        assert!(loaded
            .report
            .store_error
            .as_deref()
            .is_some_and(|message| message.contains("malformed")));
        assert!(loaded.aging_records.is_empty());
        assert_eq!(migrator.runs.get(), 0);
        assert!(loaded
            .report
            .render_human_readable()
            .contains("store_error data file"));
    }

    #[test]
    fn header_defaults_apply_when_absent() {
        let temp = TempDir::new().expect("temp");
        let path = write_store(&temp, json!({ "MCBarrelTime": 120, "prevSeeds": [3, 5] }));
        let loaded = load_store(
            &path,
            &[],
            &context(),
            &JsonDocumentSource,
            &CountingMigrator::new(),
        );
        assert_eq!(loaded.header.mc_barrel_time, 120);
        assert_eq!(loaded.header.previous_seeds, vec![3, 5]);
        assert!(loaded.header.install_time > 0);
    }

    #[test]
    fn full_pass_resolves_references_and_scopes_worlds() {
        let temp = TempDir::new().expect("temp");
        let uid = Uuid::from_u128(0xfeed);
        let other = Uuid::from_u128(0xbeef);
        let path = write_store(
            &temp,
            json!({
                "Version": CURRENT_DATA_VERSION,
                "Ingredients": {
                    "0": { "mats": { "WHEAT": 3, "LONG_GRASS,1": 2 }, "cookedTime": 4 }
                },
                "Brew": {
                    "10": { "ingId": "0", "quality": 9, "ageTime": 1.5 },
                    "11": { "ingId": "missing", "quality": 2 }
                },
                "Player": {
                    "8667ba71-b85a-4004-af54-457a9734eed7": { "quality": 3, "drunk": 40 },
                    "Steve": { "quality": 1, "drunk": 5 }
                },
                "BCauldron": {
                    uid.to_string(): {
                        "0": { "block": "1/2/3", "ingredients": { "SUGAR": 1 } }
                    }
                },
                "Barrel": {
                    uid.to_string(): {
                        "0": { "spigot": "0/64/0", "bounds": "0,64,0,2,66,2" },
                        "1": { "spigot": "5/64/5", "st": "5,64,5,6,65,6" },
                        "2": { "spigot": "9/64/9" },
                        "3": { "spigot": "9/64/9", "bounds": "1,2" }
                    },
                    other.to_string(): {
                        "0": { "spigot": "0/0/0", "bounds": "0,0,0,1,1,1" }
                    }
                },
                "Wakeup": {
                    uid.to_string(): { "0": "1.5/64/2.5/0/90" }
                }
            }),
        );

        let worlds = [WorldRef::new("world", uid)];
        let loaded = load_store(
            &path,
            &worlds,
            &context(),
            &JsonDocumentSource,
            &CountingMigrator::new(),
        );

        assert_eq!(loaded.aging_records.len(), 2);
        let resolved = loaded
            .aging_records
            .iter()
            .find(|record| record.id == 10)
            .expect("record 10");
        assert_eq!(resolved.ingredients.entries.len(), 2);
        assert_eq!(resolved.ingredients.processing_time, 4);
        let dangling = loaded
            .aging_records
            .iter()
            .find(|record| record.id == 11)
            .expect("record 11");
        assert!(dangling.ingredients.is_empty());

        assert_eq!(loaded.actors.len(), 1);
        let actor_tally = loaded.report.tally(RecordSection::Actors);
        assert_eq!(actor_tally.loaded, 1);
        assert_eq!(actor_tally.filtered, 1);

        assert_eq!(loaded.worlds.len(), 1);
        let world = loaded.worlds.get(&uid.to_string()).expect("world data");
        assert_eq!(world.vessels.len(), 1);
        assert_eq!(world.containers.len(), 2);
        assert_eq!(world.markers.len(), 1);

        let containers = loaded.report.tally(RecordSection::Containers);
        assert_eq!(containers.loaded, 2);
        assert_eq!(containers.skipped, 2);
        assert_eq!(
            loaded
                .report
                .issues_in(RecordSection::Aging)
                .map(|issue| issue.kind)
                .collect::<Vec<_>>(),
            vec![IssueKind::DanglingReference]
        );
        assert_eq!(loaded.report.tally(RecordSection::Aging).degraded, 1);
    }

    #[test]
    fn world_without_records_loads_empty() {
        let temp = TempDir::new().expect("temp");
        let path = write_store(&temp, json!({ "Barrel": {} }));
        let worlds = [WorldRef::new("empty", Uuid::from_u128(1))];
        let loaded = load_store(
            &path,
            &worlds,
            &context(),
            &JsonDocumentSource,
            &CountingMigrator::new(),
        );
        let world = loaded
            .worlds
            .get(&Uuid::from_u128(1).to_string())
            .expect("world entry");
        assert_eq!(world, &WorldData::default());
        assert_eq!(loaded.report.total_skipped(), 0);
    }
}
