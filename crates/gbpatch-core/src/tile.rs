//! 2bpp planar tile codec.
//!
//! A tile is 8x8 pixels, each a color index in `0..=3`, stored in 16 bytes.
//! Each row takes two bytes: the low bitplane first, then the high bitplane.
//! Bit 7 of each byte is the leftmost pixel.
//!
//! ```text
//! row byte 0: 0 1 1 1 1 1 0 0   (bit 0 of each pixel)
//! row byte 1: 0 1 0 0 0 0 1 0   (bit 1 of each pixel)
//! pixels:     0 3 1 1 1 1 2 0
//! ```
//!
//! Larger images are assembled from tiles with a [`TileLayout`], which says
//! where each tile of the sheet lives in the ROM.

use std::io;

use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

use crate::error::{Error, Result};
use crate::rom::RomAccess;

/// Width and height of a tile in pixels
pub const TILE_SIZE: usize = 8;

/// Encoded size of a tile in bytes
pub const TILE_BYTES: usize = 16;

/// The four shades of the display, indexed by color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, Display)]
#[repr(u8)]
pub enum Shade {
    White = 0,
    LightGray = 1,
    DarkGray = 2,
    Black = 3,
}

impl Shade {
    pub fn from_index(index: u8) -> Option<Self> {
        Self::from_repr(index)
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::White => [0xFF, 0xFF, 0xFF],
            Self::LightGray => [0xC0, 0xC0, 0xC0],
            Self::DarkGray => [0x40, 0x40, 0x40],
            Self::Black => [0x00, 0x00, 0x00],
        }
    }

    /// The shade closest to `rgb` by squared distance
    pub fn nearest(rgb: [u8; 3]) -> Self {
        Self::iter()
            .min_by_key(|shade| {
                shade
                    .rgb()
                    .iter()
                    .zip(rgb.iter())
                    .map(|(&a, &b)| (a as i32 - b as i32).pow(2))
                    .sum::<i32>()
            })
            .unwrap_or(Self::White)
    }
}

/// One 8x8 tile of color indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pixels: [[u8; TILE_SIZE]; TILE_SIZE],
}

impl Tile {
    /// Decode 16 bytes of planar data
    pub fn decode(data: &[u8; TILE_BYTES]) -> Self {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in pixels.iter_mut().enumerate() {
            let low = data[y * 2];
            let high = data[y * 2 + 1];
            for (x, pixel) in row.iter_mut().enumerate() {
                let bit = 7 - x;
                *pixel = ((low >> bit) & 1) | (((high >> bit) & 1) << 1);
            }
        }
        Self { pixels }
    }

    /// Encode to 16 bytes of planar data
    pub fn encode(&self) -> [u8; TILE_BYTES] {
        let mut data = [0u8; TILE_BYTES];
        for (y, row) in self.pixels.iter().enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                let bit = 7 - x;
                if pixel & 1 != 0 {
                    data[y * 2] |= 1 << bit;
                }
                if pixel & 2 != 0 {
                    data[y * 2 + 1] |= 1 << bit;
                }
            }
        }
        data
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    /// Set a pixel, rejecting color indices above 3
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Result<()> {
        if value > Shade::Black.index() {
            return Err(Error::InvalidPixel { x, y, value });
        }
        self.pixels[y][x] = value;
        Ok(())
    }

    pub fn rows(&self) -> &[[u8; TILE_SIZE]; TILE_SIZE] {
        &self.pixels
    }
}

/// Read the tile stored at `offset`
pub fn read_tile<R: RomAccess + ?Sized>(rom: &mut R, offset: u64) -> Result<Tile> {
    let bytes = rom.read_bytes(offset, TILE_BYTES)?;
    let data: [u8; TILE_BYTES] = bytes.as_slice().try_into().map_err(|_| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "tile at 0x{:X} needs {} bytes, only {} available",
                offset,
                TILE_BYTES,
                bytes.len()
            ),
        )
    })?;
    Ok(Tile::decode(&data))
}

/// Write `tile` at `offset`
pub fn write_tile<R: RomAccess + ?Sized>(rom: &mut R, offset: u64, tile: &Tile) -> Result<()> {
    rom.write_bytes(offset, &tile.encode())
}

/// Largest sheet a layout may describe: every tile of an 8 MiB cartridge
pub const MAX_LAYOUT_TILES: usize = 0x8_0000;

fn grid_tile_count(width: usize, height: usize) -> Result<usize> {
    match width.checked_mul(height) {
        Some(0) => Err(Error::InvalidLayout(format!(
            "{}x{} grid has no tiles",
            width, height
        ))),
        Some(count) if count <= MAX_LAYOUT_TILES => Ok(count),
        _ => Err(Error::InvalidLayout(format!(
            "{}x{} grid exceeds {} tiles",
            width, height, MAX_LAYOUT_TILES
        ))),
    }
}

/// Where each tile of a sheet lives in the ROM.
///
/// Tiles are numbered row-major across a `width` x `height` grid. Tile `i`
/// is stored at `base + mapping[i] * 16`. `base` starts at the offset given
/// to [`read_sheet`] / [`write_sheet`]; a non-zero `jump_to[i]` replaces it
/// from tile `i` onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    width: usize,
    height: usize,
    mapping: Vec<usize>,
    jump_to: Vec<u64>,
}

impl TileLayout {
    /// Build a layout. `jump_to` may be empty; otherwise it needs one entry
    /// per tile, like `mapping`.
    pub fn new(width: usize, height: usize, mapping: Vec<usize>, jump_to: Vec<u64>) -> Result<Self> {
        let count = grid_tile_count(width, height)?;
        if mapping.len() != count {
            return Err(Error::InvalidLayout(format!(
                "{}x{} grid needs {} mapping entries, got {}",
                width,
                height,
                count,
                mapping.len()
            )));
        }
        if !jump_to.is_empty() && jump_to.len() != count {
            return Err(Error::InvalidLayout(format!(
                "{}x{} grid needs {} jump entries, got {}",
                width,
                height,
                count,
                jump_to.len()
            )));
        }
        Ok(Self {
            width,
            height,
            mapping,
            jump_to,
        })
    }

    /// Tiles stored back to back in reading order
    pub fn sequential(width: usize, height: usize) -> Result<Self> {
        let count = grid_tile_count(width, height)?;
        Self::new(width, height, (0..count).collect(), Vec::new())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.width * self.height
    }

    /// Sheet size in pixels
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width * TILE_SIZE, self.height * TILE_SIZE)
    }

    /// ROM offset of every tile, in sheet order
    pub fn tile_offsets(&self, offset: u64) -> Vec<u64> {
        let mut base = offset;
        (0..self.tile_count())
            .map(|i| {
                if let Some(&jump) = self.jump_to.get(i)
                    && jump != 0
                {
                    base = jump;
                }
                base + self.mapping[i] as u64 * TILE_BYTES as u64
            })
            .collect()
    }

    /// Top-left pixel of tile `i` within the sheet
    fn tile_origin(&self, i: usize) -> (usize, usize) {
        ((i % self.width) * TILE_SIZE, (i / self.width) * TILE_SIZE)
    }
}

/// A grid of color indices built from tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSheet {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl TileSheet {
    /// A blank (all white) sheet
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Wrap row-major color indices, rejecting values above 3
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::InvalidLayout(format!(
                "{} pixels do not fill a {}x{} sheet",
                pixels.len(),
                width,
                height
            )));
        }
        if let Some(i) = pixels.iter().position(|&p| p > Shade::Black.index()) {
            return Err(Error::InvalidPixel {
                x: i % width,
                y: i / width,
                value: pixels[i],
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn paste(&mut self, tile: &Tile, (ox, oy): (usize, usize)) {
        for (y, row) in tile.rows().iter().enumerate() {
            let start = (oy + y) * self.width + ox;
            self.pixels[start..start + TILE_SIZE].copy_from_slice(row);
        }
    }

    fn crop(&self, (ox, oy): (usize, usize)) -> Tile {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in pixels.iter_mut().enumerate() {
            let start = (oy + y) * self.width + ox;
            row.copy_from_slice(&self.pixels[start..start + TILE_SIZE]);
        }
        Tile { pixels }
    }
}

impl From<Tile> for TileSheet {
    fn from(tile: Tile) -> Self {
        let mut sheet = Self::new(TILE_SIZE, TILE_SIZE);
        sheet.paste(&tile, (0, 0));
        sheet
    }
}

/// Assemble a sheet from the tiles `layout` points at
pub fn read_sheet<R: RomAccess + ?Sized>(
    rom: &mut R,
    offset: u64,
    layout: &TileLayout,
) -> Result<TileSheet> {
    let (width, height) = layout.pixel_size();
    let mut sheet = TileSheet::new(width, height);
    for (i, tile_offset) in layout.tile_offsets(offset).into_iter().enumerate() {
        let tile = read_tile(rom, tile_offset)?;
        sheet.paste(&tile, layout.tile_origin(i));
    }
    Ok(sheet)
}

/// Split `sheet` into tiles and write each where `layout` points.
///
/// The sheet must be exactly the layout's pixel size.
pub fn write_sheet<R: RomAccess + ?Sized>(
    rom: &mut R,
    offset: u64,
    sheet: &TileSheet,
    layout: &TileLayout,
) -> Result<()> {
    let (width, height) = layout.pixel_size();
    if (sheet.width, sheet.height) != (width, height) {
        return Err(Error::TileSize {
            expected_width: width,
            expected_height: height,
            actual_width: sheet.width,
            actual_height: sheet.height,
        });
    }

    for (i, tile_offset) in layout.tile_offsets(offset).into_iter().enumerate() {
        let tile = sheet.crop(layout.tile_origin(i));
        write_tile(rom, tile_offset, &tile)?;
    }
    Ok(())
}
