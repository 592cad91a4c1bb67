//! Tile export/import commands.
//!
//! Export decodes tiles from a ROM into a PNG drawn in the four display
//! shades. Import maps every PNG pixel to its nearest shade and writes the
//! encoded tiles back.

use std::path::Path;

use anyhow::{Context, Result, bail};
use gbpatch_core::{RomFile, Shade, TileLayout, TileSheet, read_sheet, write_sheet};
use image::{Rgb, RgbImage};

use super::offset_utils::format_offset;
use crate::cli::{TileCommand, TileTarget};

/// Run a tile subcommand
pub fn run(command: &TileCommand) -> Result<()> {
    match command {
        TileCommand::Export { target, out } => export(target, out),
        TileCommand::Import { target, image } => import(target, image),
    }
}

fn export(target: &TileTarget, out: &Path) -> Result<()> {
    let layout = layout_for(target)?;
    let mut rom = RomFile::open(&target.rom)
        .with_context(|| format!("Failed to open {}", target.rom.display()))?;

    let sheet = read_sheet(&mut rom, target.offset, &layout)?;
    sheet_to_image(&sheet)
        .save(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "Exported {} tile(s) at {} to {}",
        layout.tile_count(),
        format_offset(target.offset),
        out.display()
    );
    Ok(())
}

fn import(target: &TileTarget, image_path: &Path) -> Result<()> {
    let layout = layout_for(target)?;
    let image = image::open(image_path)
        .with_context(|| format!("Failed to read {}", image_path.display()))?
        .to_rgb8();
    let sheet = image_to_sheet(&image)?;

    let mut rom = RomFile::open(&target.rom)
        .with_context(|| format!("Failed to open {}", target.rom.display()))?;
    write_sheet(&mut rom, target.offset, &sheet, &layout)?;
    rom.sync()?;

    println!(
        "Imported {} into {} tile(s) at {}",
        image_path.display(),
        layout.tile_count(),
        format_offset(target.offset)
    );
    Ok(())
}

/// Build the layout described by the command-line flags
pub fn layout_for(target: &TileTarget) -> Result<TileLayout> {
    let (width, height) = (target.size.width, target.size.height);
    let layout = if target.mapping.is_empty() {
        if !target.jump.is_empty() {
            bail!("--jump needs an explicit --mapping");
        }
        TileLayout::sequential(width, height)?
    } else {
        TileLayout::new(width, height, target.mapping.clone(), target.jump.clone())?
    };
    Ok(layout)
}

/// Render color indices with the display palette
pub fn sheet_to_image(sheet: &TileSheet) -> RgbImage {
    RgbImage::from_fn(sheet.width() as u32, sheet.height() as u32, |x, y| {
        let shade = Shade::from_index(sheet.get(x as usize, y as usize)).unwrap_or(Shade::White);
        Rgb(shade.rgb())
    })
}

/// Map each pixel to the nearest display shade
pub fn image_to_sheet(image: &RgbImage) -> Result<TileSheet> {
    let pixels = image
        .pixels()
        .map(|pixel| Shade::nearest(pixel.0).index())
        .collect();
    Ok(TileSheet::from_pixels(
        image.width() as usize,
        image.height() as usize,
        pixels,
    )?)
}
