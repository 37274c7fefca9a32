//! Command handlers.
//!
//! Each subcommand gets a handler over a shared [`RegionManager`] wired to
//! the snapshot-backed engine. Engine errors surface as one-line messages;
//! nothing here retries or panics.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tilevault::config::ConfigFile;
use tilevault::engine::memory::{MemoryEngine, MemoryEngineConfig};
use tilevault::geo::LatLngBounds;
use tilevault::{
    DownloadObserver, DownloadOutcome, RegionEvent, RegionId, RegionManager, RegionRequest,
    RegionSummary,
};

use crate::error::CliError;

/// Arguments for the `download` subcommand.
pub struct DownloadArgs {
    pub name: String,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub zoom: f64,
    pub max_zoom: Option<f64>,
}

/// Build the manager from config: snapshot-backed engine, shared client.
pub fn build_manager(config: &ConfigFile) -> Result<RegionManager, CliError> {
    let engine_config = MemoryEngineConfig {
        tick: Duration::from_millis(config.engine.tick_ms),
        required_resources: config.engine.required_resources,
        tile_limit: config.engine.tile_limit,
        ..MemoryEngineConfig::default()
    };
    let engine = MemoryEngine::with_snapshot(config.state_path(), engine_config)?;
    Ok(RegionManager::new(Arc::new(engine)))
}

/// Download a region and render progress until the terminal event.
pub async fn download(
    manager: &RegionManager,
    config: &ConfigFile,
    args: DownloadArgs,
) -> Result<(), CliError> {
    let bounds = LatLngBounds::new(args.north, args.south, args.east, args.west);
    let request = RegionRequest::new(&config.map.style_url, bounds)
        .zoom(args.zoom)
        .max_zoom(args.max_zoom.unwrap_or(config.map.max_zoom))
        .pixel_ratio(config.map.pixel_ratio);

    let download = manager.download_region(request, &args.name).await?;
    info!("downloading region {} as {:?}", download.region.id, args.name);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .expect("static progress template"),
    );
    bar.set_message("sizing region...");

    let mut observer = DownloadObserver::new(download.events);
    while let Some(event) = observer.next_event().await {
        if let RegionEvent::LimitExceeded(limit) = &event {
            bar.println(format!(
                "{} region exceeds tile limit of {}",
                style("warning:").yellow().bold(),
                limit
            ));
        }
        match observer.percent_complete() {
            Some(pct) => {
                bar.set_position(pct.round() as u64);
                bar.set_message(args.name.clone());
            }
            // Required count still unknown; percentage would be meaningless.
            None => bar.tick(),
        }
        if event.is_terminal() {
            break;
        }
    }

    match observer.outcome() {
        Some(DownloadOutcome::Completed(status)) => {
            bar.finish_with_message("done");
            println!(
                "{} region {} ({}) downloaded, {} resources",
                style("✓").green().bold(),
                download.region.id,
                args.name,
                status.completed_resources
            );
            Ok(())
        }
        Some(DownloadOutcome::Failed(reason)) => {
            bar.abandon_with_message("failed");
            Err(CliError::DownloadFailed(reason.clone()))
        }
        None => {
            bar.abandon_with_message("interrupted");
            Err(CliError::DownloadFailed(
                "event stream closed before a terminal event".to_string(),
            ))
        }
    }
}

/// List stored regions with decoded names.
pub async fn list(manager: &RegionManager) -> Result<(), CliError> {
    let regions = manager.list_regions().await?;
    if regions.is_empty() {
        println!("No regions downloaded yet.");
        return Ok(());
    }

    for region in &regions {
        println!(
            "{:>5}  {:<24}  {}  z{:.0}-{:.0}",
            region.id.to_string(),
            display_name(region),
            region.definition.bounds,
            region.definition.min_zoom,
            region.definition.max_zoom
        );
    }
    Ok(())
}

/// Print the camera target for a region.
pub async fn goto(manager: &RegionManager, id: u64) -> Result<(), CliError> {
    let region = find_region(manager, id).await?;
    let target = manager.select_region(&region);
    println!(
        "{} {} -> center {} zoom {:.1}",
        style("→").cyan().bold(),
        display_name(&region),
        target.center,
        target.zoom
    );
    Ok(())
}

/// Delete a region from engine storage.
pub async fn delete(manager: &RegionManager, id: u64) -> Result<(), CliError> {
    // Resolve first so a bad id reads as "no such region", not a raw
    // engine delete error.
    let region = find_region(manager, id).await?;
    manager.delete_region(region.id).await?;
    println!(
        "{} region {} ({}) deleted",
        style("✓").green().bold(),
        region.id,
        display_name(&region)
    );
    Ok(())
}

async fn find_region(manager: &RegionManager, id: u64) -> Result<RegionSummary, CliError> {
    let regions = manager.list_regions().await?;
    regions
        .into_iter()
        .find(|region| region.id == RegionId(id))
        .ok_or(CliError::NoSuchRegion(id))
}

fn display_name(region: &RegionSummary) -> String {
    region
        .name
        .clone()
        .unwrap_or_else(|| "(unnamed)".to_string())
}
