//! Parsing helpers for ROM offsets and tile grids on the command line.

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use gbpatch_core::MAX_LAYOUT_TILES;

/// Parse a hex offset string (with or without 0x prefix).
pub fn parse_hex_offset(s: &str) -> Result<u64> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map_err(|e| anyhow!("Invalid hex offset '{}': {}", s, e))
}

/// Format an offset as a hex string with 0x prefix.
pub fn format_offset(offset: u64) -> String {
    format!("0x{:X}", offset)
}

/// Tile grid dimensions, written `WIDTHxHEIGHT` (e.g. `5x2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl FromStr for GridSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((w, h)) = s.split_once(['x', 'X']) else {
            bail!("Invalid grid size '{}', expected WIDTHxHEIGHT", s);
        };
        let width = w.trim().parse::<usize>()?;
        let height = h.trim().parse::<usize>()?;
        if width == 0 || height == 0 {
            bail!("Grid size '{}' must be at least 1x1", s);
        }
        if width.checked_mul(height).is_none_or(|count| count > MAX_LAYOUT_TILES) {
            bail!("Grid size '{}' exceeds {} tiles", s, MAX_LAYOUT_TILES);
        }
        Ok(Self { width, height })
    }
}

/// clap value parser for [`GridSize`]
pub fn parse_grid_size(s: &str) -> Result<GridSize> {
    s.parse()
}
