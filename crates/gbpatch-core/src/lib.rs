//! # gbpatch-core
//!
//! Core library for the Game Boy ROM patch manager.
//!
//! This crate provides:
//! - IPS patch parsing and serialization
//! - Overlap detection between patches
//! - Random-access ROM stores (file-backed and in-memory)
//! - Patch discovery and batch application
//! - 2bpp tile extraction and injection

pub mod catalog;
pub mod config;
pub mod error;
pub mod ips;
mod path;
pub mod patcher;
pub mod rom;
pub mod tile;

pub use catalog::PatchCatalog;
pub use config::{CONFIG_FILE, PatcherConfig, PatcherConfigBuilder};
pub use error::{Error, Result};
pub use ips::{ConflictCheck, IpsPatch, PatchRecord, find_first_conflict, has_conflict};
pub use patcher::{ApplyReport, PatchOutcome, Patcher, apply_patch, backup_path, prepare_output};
pub use rom::{RomAccess, RomBuffer, RomFile};
pub use tile::{
    MAX_LAYOUT_TILES, Shade, TILE_BYTES, TILE_SIZE, Tile, TileLayout, TileSheet, read_sheet, read_tile, write_sheet,
    write_tile,
};
