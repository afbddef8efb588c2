//! Command line front end: inspect the text layout of a ROM and dump
//! decoded strings.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};

use romtext::decoding::string_table::StringTable;
use romtext::{BitOrder, ForestParams, RomBytes, TextForest, TreeConvention};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BitOrderArg {
    Msb0,
    Lsb0,
}

impl From<BitOrderArg> for BitOrder {
    fn from(arg: BitOrderArg) -> BitOrder {
        match arg {
            BitOrderArg::Msb0 => BitOrder::Msb0,
            BitOrderArg::Lsb0 => BitOrder::Lsb0,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "romtext",
    version,
    about = "Decoder for the context-adaptive Huffman text format used by Camelot's GBA games"
)]
struct Cli {
    /// ROM file to open.
    rom: PathBuf,

    /// File offset of the character data pointer pair. There is no
    /// signature to search for, every ROM version has its own value
    /// (0x3842c for Golden Sun USA/Europe).
    #[arg(long, value_parser = parse_offset)]
    pair_address: usize,

    /// Bit order of tree shapes and the text stream, as calibrated against
    /// this ROM version.
    #[arg(long, value_enum)]
    bit_order: BitOrderArg,

    /// Structure-bit value that marks a tree leaf (0 or 1).
    #[arg(long)]
    leaf_bit: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every character's lookup table and tree layout.
    Layout,
    /// Decode strings through a string pointer table.
    Dump {
        /// File offset of the string pointer table.
        #[arg(long, value_parser = parse_offset)]
        table: usize,
        /// Number of entries to read.
        #[arg(long)]
        count: usize,
        /// Runaway guard: maximum characters per string.
        #[arg(long, default_value_t = 4096)]
        limit: usize,
    },
}

fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{}", e))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let leaf_when_set = match cli.leaf_bit {
        0 => false,
        1 => true,
        other => bail!("--leaf-bit must be 0 or 1, got {}", other),
    };
    let params = ForestParams {
        pair_address: cli.pair_address,
        convention: TreeConvention {
            bit_order: cli.bit_order.into(),
            leaf_when_set,
        },
    };

    let data = fs::read(&cli.rom)
        .wrap_err_with(|| format!("Failed to read ROM file {}", cli.rom.display()))?;
    tracing::info!(size = data.len(), "loaded ROM image");
    let rom = RomBytes::new(data);

    let forest = TextForest::build(&rom, &params).wrap_err("Failed to build the text forest")?;
    tracing::info!(
        characters = forest.len(),
        "built text forest (tree block {:#x}, offset table {:#x})",
        forest.root().tree_block_base,
        forest.root().offset_table_base
    );

    match cli.command {
        Command::Layout => {
            for (code, entry) in forest.entries() {
                let shown = char::from(code).escape_default().to_string();
                match entry {
                    Some(entry) => {
                        let span = entry.span();
                        println!(
                            "{:#04x} {:>4} lookup: {:>3} symbols, {:>3} bytes  tree: {:#x}..{:#x} ({} nodes)",
                            code,
                            shown,
                            entry.lookup().len(),
                            entry.lookup().size_bytes(),
                            span.start,
                            span.end,
                            entry.tree().node_count(),
                        );
                    }
                    None => println!("{:#04x} {:>4} (no tree)", code, shown),
                }
            }
        }
        Command::Dump { table, count, limit } => {
            let table = StringTable::parse(&rom, table, count)
                .wrap_err("Failed to read the string pointer table")?;
            for (index, result) in table.decode_all(&forest, &rom, limit).enumerate() {
                match result {
                    Ok(string) => println!("{:>5}: {:?}", index, string),
                    Err(e) => {
                        tracing::warn!(index, error = %e, "string failed to decode");
                        println!("{:>5}: <error: {}>", index, e);
                    }
                }
            }
        }
    }

    Ok(())
}
