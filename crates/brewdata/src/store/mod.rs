mod base91;
mod codec;
mod config;
mod document;
mod geometry;
mod legacy;
mod migration;
mod pipeline;
mod records;
mod report;
mod resolver;
mod types;
mod version;
mod world;

pub use base91::Base91Error;
pub use codec::{
    decode_ingredients, encode_ingredients, encode_ingredients_with_version,
    try_decode_ingredients, BlobOutcome, IngredientCodecError, CURRENT_BLOB_VERSION,
    SUPPORTED_BLOB_VERSIONS,
};
pub use config::{load_config, ConfigError, LoaderConfig, WorldConfig};
pub use document::{DataDocument, DocumentError, DocumentSource, JsonDocumentSource, Section};
pub use geometry::{reconstruct_bounds, BlockPos, BoundingBox, BoundsEncoding, CoordError};
pub use legacy::decode_legacy_ingredients;
pub use migration::{MigrationError, Migrator, VersionStampMigrator};
pub use pipeline::{load_store, LoadContext, LoadError, LoadedStore, StoreHeader, WorldData};
pub use records::IngredientLookup;
pub use report::{IssueKind, LoadReport, RecordIssue, RecordSection, SectionTally};
pub use resolver::{
    default_renames, ExactMatch, FuzzyMatch, MaterialCatalog, MaterialResolver, RenameTable,
    ResolverChain,
};
pub use types::{
    ActorIdentity, ActorProgress, AgingRecord, Container, HeatedVessel, Ingredient,
    IngredientBundle, MaterialId, SpatialMarker,
};
pub use version::{check_data_version, VersionCheck, CURRENT_DATA_VERSION, VERSION_KEY};
pub use world::{WorldRef, LINKED_WORLD_PREFIX};
