//! KeyCharm demo shell.
//!
//! Reads a catalog JSON file (an array of raw catalog descriptors), lays
//! the charms out by driving the composer's pointer interface, captures a
//! snapshot and prints the composition record to stdout.
//!
//! Usage: `keycharm <catalog.json> [snapshot.png]`

use keycharm_core::builder::Composer;
use keycharm_core::catalog::RawCatalogItem;
use keycharm_core::geometry::LOGICAL_WIDTH;
use keycharm_core::input::PointerEvent;
use keycharm_render::{share, GraphicStore, SnapshotExporter};
use kurbo::{Point, Rect};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let catalog_path = PathBuf::from(args.next().unwrap_or_else(|| "catalog.json".to_string()));
    let output_path = PathBuf::from(
        args.next()
            .unwrap_or_else(|| share::suggested_file_name("keyring")),
    );

    log::info!("loading catalog from {}", catalog_path.display());
    let catalog_json = std::fs::read_to_string(&catalog_path)?;
    let raw_items: Vec<RawCatalogItem> = serde_json::from_str(&catalog_json)?;

    let mut composer = Composer::new();
    // Headless run: pretend the surface renders 1:1 at the logical size.
    composer.set_display_rect(Rect::new(0.0, 0.0, LOGICAL_WIDTH, composer.canvas_height()));

    let mut ids = Vec::new();
    for raw in raw_items {
        match composer.ingest(raw) {
            Ok(id) => ids.push(id),
            Err(e) => log::warn!("skipping catalog item: {e}"),
        }
    }
    log::info!("placed {} charms", ids.len());

    // Spread the charms into a column by dragging each from its jittered
    // drop position, and fan their rotations a little.
    let step = composer.canvas_height() / (ids.len().max(1) as f64 + 1.0);
    for (i, &id) in ids.iter().enumerate() {
        let from = composer
            .placement()
            .get(id)
            .map(|item| item.position)
            .unwrap_or(Point::ZERO);
        let to = Point::new(LOGICAL_WIDTH / 2.0, step * (i as f64 + 1.0));

        composer.handle_pointer(PointerEvent::Down { position: from });
        composer.handle_pointer(PointerEvent::Move { position: to });
        composer.handle_pointer(PointerEvent::Up { position: to });
        composer.set_rotation(id, (i as f64 - ids.len() as f64 / 2.0) * 15.0);
    }
    composer.select(None);

    let mut store = GraphicStore::new();
    for item in composer.placement().items() {
        store.register(&item.item);
    }

    let mut exporter = SnapshotExporter::new();
    let snapshot = exporter.capture(&composer, &mut store);
    match &snapshot {
        Some(png_data) => share::export_png(png_data, &output_path)?,
        None => log::warn!("no snapshot available, continuing without one"),
    }

    let record = composer.composition_record(snapshot.as_deref());
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
