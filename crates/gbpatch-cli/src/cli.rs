use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::offset_utils::{GridSize, parse_grid_size, parse_hex_offset};

const EXAMPLES: &str = "\
Examples:
    gbpatch --list
    gbpatch MoonJump FastSkating
    gbpatch --all
    gbpatch --interactive
    gbpatch --input mygame.gb --output mygame_patched.gb MoonJump
    gbpatch tile export --rom sod.mod.gb --offset 0x11262 --size 5x2 \\
        --mapping 0,2,4,6,8,1,3,5,7,9 --out dog_a.png

Available patches are loaded from the 'patches/' directory.";

#[derive(Parser)]
#[command(name = "gbpatch", version)]
#[command(about = "Apply IPS patches to Game Boy ROM files")]
#[command(after_help = EXAMPLES)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub apply: ApplyArgs,
}

#[derive(Args, Debug, Default)]
pub struct ApplyArgs {
    /// List all available patches
    #[arg(short, long)]
    pub list: bool,

    /// Apply all available patches
    #[arg(short, long)]
    pub all: bool,

    /// Interactive mode to select patches
    #[arg(short, long)]
    pub interactive: bool,

    /// Apply patches even if conflicts are detected
    #[arg(short, long)]
    pub force: bool,

    /// Input ROM file [default: sod.gb]
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output ROM file [default: sod.mod.gb]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory containing .ips patches [default: patches]
    #[arg(long, value_name = "DIR", env = "GBPATCH_PATCHES_DIR")]
    pub patches_dir: Option<PathBuf>,

    /// Config file [default: gbpatch.toml, if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Patch names to apply
    pub patches: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract or inject 2bpp tiles
    #[command(subcommand)]
    Tile(TileCommand),
}

#[derive(Subcommand)]
pub enum TileCommand {
    /// Read tiles from a ROM and save them as a PNG
    Export {
        #[command(flatten)]
        target: TileTarget,

        /// PNG file to write
        #[arg(long, value_name = "PNG")]
        out: PathBuf,
    },
    /// Read a PNG and write it into a ROM as tiles
    Import {
        #[command(flatten)]
        target: TileTarget,

        /// PNG file to read
        #[arg(long, value_name = "PNG")]
        image: PathBuf,
    },
}

/// Where tiles live in the ROM
#[derive(Args, Debug)]
pub struct TileTarget {
    /// ROM file to read from or write to
    #[arg(long, value_name = "FILE")]
    pub rom: PathBuf,

    /// Base offset of the first tile (hex)
    #[arg(long, value_parser = parse_hex_offset)]
    pub offset: u64,

    /// Sheet size in tiles, WIDTHxHEIGHT
    #[arg(long, default_value = "1x1", value_parser = parse_grid_size)]
    pub size: GridSize,

    /// Tile slot for each sheet position, row-major [default: 0,1,2,...]
    #[arg(long, value_delimiter = ',')]
    pub mapping: Vec<usize>,

    /// Replacement base offset per sheet position (hex, 0 keeps the current base)
    #[arg(long, value_delimiter = ',', value_parser = parse_hex_offset)]
    pub jump: Vec<u64>,
}
