mod demo;

use std::path::{Path, PathBuf};

use bevy::log::LogPlugin;
use bevy::prelude::*;

use composition_fixer::activation_gate::{ActiveTool, PrefabChanged, ToolChanged};
use composition_fixer::inspector::InspectEdge;
use composition_fixer::original_flags::OriginalFlagsArchive;
use composition_fixer::settings::FixerSettings;
use composition_fixer::stats::FixerStats;
use composition_fixer::upgrade_modes::ApplyUpgrade;
use composition_fixer::CompositionFixerPlugin;

/// Path of the retained-originals archive. Restored on start if present,
/// rewritten on exit.
const ORIGINALS_ENV_VAR: &str = "ROAD_UPGRADES_ORIGINALS";

/// Updates to run after each scripted step.
const SETTLE_UPDATES: u32 = 2;

fn settle(app: &mut App) {
    for _ in 0..SETTLE_UPDATES {
        app.update();
    }
}

fn restore_originals(world: &mut World, path: &Path) {
    match std::fs::read(path) {
        Ok(bytes) => {
            let restored = OriginalFlagsArchive::decode_or_warn(&bytes).restore(world);
            info!("Restored {restored} original flag records from {}", path.display());
        }
        Err(e) => warn!("Could not read {}: {e}", path.display()),
    }
}

fn save_originals(world: &World, path: &Path) {
    let archive = OriginalFlagsArchive::capture(world);
    match std::fs::write(path, archive.to_bytes()) {
        Ok(()) => info!(
            "Saved {} original flag records to {}",
            archive.len(),
            path.display()
        ),
        Err(e) => warn!("Could not write {}: {e}", path.display()),
    }
}

fn main() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin {
            filter: "wgpu=error,composition_fixer=debug".to_string(),
            ..default()
        })
        .insert_resource(FixerSettings::from_env())
        .add_plugins(CompositionFixerPlugin);
    app.update();

    let net = demo::spawn_demo_network(app.world_mut());
    let archive_path = std::env::var_os(ORIGINALS_ENV_VAR).map(PathBuf::from);
    if let Some(path) = archive_path.as_deref().filter(|p| p.exists()) {
        restore_originals(app.world_mut(), path);
    }

    // The player picks the net tool with the retaining wall mode selected.
    app.world_mut().send_event(ToolChanged {
        tool: ActiveTool::NetEdit,
    });
    app.world_mut().send_event(PrefabChanged {
        prefab: Some("RetainingWall".to_string()),
    });
    app.world_mut().send_event(ApplyUpgrade {
        edge: net.a,
        mode: "RetainingWall".to_string(),
    });
    settle(&mut app);

    app.world_mut().send_event(PrefabChanged {
        prefab: Some("Quay".to_string()),
    });
    app.world_mut().send_event(ApplyUpgrade {
        edge: net.c,
        mode: "Quay".to_string(),
    });
    settle(&mut app);

    for edge in [net.a, net.b, net.c, net.d] {
        app.world_mut().send_event(InspectEdge { edge });
    }
    settle(&mut app);

    let stats = app.world().resource::<FixerStats>();
    info!(
        "Done: {} passes, {} fixes over {} edges",
        stats.passes,
        stats.totals.pairs_fixed(),
        stats.totals.edges_visited
    );

    if let Some(path) = archive_path.as_deref() {
        save_originals(app.world(), path);
    }
}
