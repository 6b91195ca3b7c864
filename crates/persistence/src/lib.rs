#![deny(warnings)]

//! Persistence layer: JSON snapshots of the game state in a save directory.
//!
//! One slot is one `<slot>.json` file. Reads return raw JSON so that loading
//! always goes through the engine's merge, which fills in anything an older
//! save lacks.

use anyhow::{bail, Context, Result};
use mayor_catalog::Catalog;
use mayor_core::{GameState, SimConfig};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Path of `slot` inside `dir`.
pub fn snapshot_path(dir: &Path, slot: &str) -> Result<PathBuf> {
    if slot.is_empty() || slot.contains(['/', '\\']) || slot.starts_with('.') {
        bail!("invalid save slot name {slot:?}");
    }
    Ok(dir.join(format!("{slot}.json")))
}

/// Write `state` as pretty JSON, replacing any previous save atomically.
pub fn write_snapshot(dir: &Path, slot: &str, state: &GameState) -> Result<PathBuf> {
    let path = snapshot_path(dir, slot)?;
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let data = serde_json::to_vec_pretty(state)?;
    let tmp = dir.join(format!(".{slot}.json.tmp"));
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
    info!(path = %path.display(), "snapshot written");
    Ok(path)
}

/// Raw JSON of a save, or `None` when the slot is empty.
pub fn read_snapshot(dir: &Path, slot: &str) -> Result<Option<Value>> {
    let path = snapshot_path(dir, slot)?;
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(value))
}

/// Load a slot into a complete state. An empty slot starts a new game.
pub fn load_game(dir: &Path, slot: &str, catalog: &Catalog, config: &SimConfig) -> Result<GameState> {
    let default = mayor_engine::default_state(catalog, config);
    match read_snapshot(dir, slot)? {
        Some(saved) => {
            let state = mayor_engine::merge(&default, &saved, catalog)
                .with_context(|| format!("loading save slot {slot}"))?;
            Ok(state)
        }
        None => {
            info!(slot, "no save found, starting a new game");
            Ok(default)
        }
    }
}
