use std::path::Path;
use std::process::ExitCode;

use brewdata::{
    load_config, load_store, resolve_data_paths, JsonDocumentSource, LoadedStore, LoaderConfig,
    VersionStampMigrator,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    info!("=== Brewdata Inspect ===");

    match run() {
        Ok(loaded) => {
            println!("{}", loaded.report.render_human_readable());
            for (world_key, world) in &loaded.worlds {
                println!(
                    "world={world_key} vessels={} containers={} markers={}",
                    world.vessels.len(),
                    world.containers.len(),
                    world.markers.len()
                );
            }
            if loaded.report.store_error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(message) => {
            error!(error = %message, "inspect_failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<LoadedStore, String> {
    let paths = resolve_data_paths().map_err(|error| error.to_string())?;
    let config = load_config(&paths.config_file).map_err(|error| error.to_string())?;
    let data_file = config.data_file_in(&paths.root);
    info!(
        root = %paths.root.display(),
        config_file = %paths.config_file.display(),
        data_file = %data_file.display(),
        worlds = config.worlds.len(),
        materials = config.materials.len(),
        "inspect_config_resolved"
    );

    warn_if_catalog_empty(&config, &paths.config_file);

    let context = config.load_context();
    let migrator = VersionStampMigrator::new(config.current_version.clone());
    Ok(load_store(
        &data_file,
        &config.world_refs(&paths.root),
        &context,
        &JsonDocumentSource,
        &migrator,
    ))
}

// Every ingredient is dropped as unknown when no materials are configured.
fn warn_if_catalog_empty(config: &LoaderConfig, config_file: &Path) -> bool {
    if !config.materials.is_empty() {
        return false;
    }
    warn!(
        config_file = %config_file.display(),
        "material_catalog_empty"
    );
    true
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
