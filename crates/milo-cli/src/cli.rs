use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use milo_types::Endian;

#[derive(Parser)]
#[command(
    name = "milo",
    about = "Inspect, verify and unpack Milo scene files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML codec configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Byte order to try first (little or big)
    #[arg(long, global = true)]
    pub endian: Option<Endian>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the directory tree of a scene file
    Inspect(InspectArgs),
    /// Decode and re-encode files, reporting any byte difference
    Roundtrip(RoundtripArgs),
    /// Write every raw entry payload to disk
    Extract(ExtractArgs),
    /// List registered type handlers
    Types,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
    /// Print field values of typed records
    #[arg(long)]
    pub fields: bool,
    /// Print metadata script trees
    #[arg(long)]
    pub dtb: bool,
}

#[derive(Args)]
pub struct RoundtripArgs {
    /// Files, or folders to search
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// File extensions picked up when searching folders
    #[arg(long = "ext", default_values = ["milo", "milo_xbox", "milo_ps3", "milo_wii"])]
    pub extensions: Vec<String>,
}

#[derive(Args)]
pub struct ExtractArgs {
    pub file: PathBuf,
    /// Output folder
    #[arg(short, long)]
    pub out: PathBuf,
}
