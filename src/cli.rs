use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "atomco",
    about = "Inspect, convert and constrain atomic coordinate files",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct Verbosity {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize a structure file
    Info(InfoArgs),

    /// Read one format and write another (chosen by file name)
    Convert(ConvertArgs),

    /// Set selective-dynamics flags for every atom of one type
    Constrain(ConstrainArgs),

    /// List the frames of an XDATCAR trajectory
    Frames(FramesArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the parsed system as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ConstrainArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Atom type to edit, e.g. O
    #[arg(long = "atom", value_name = "TYPE")]
    pub atom_type: String,

    /// T (movable) or F (fixed)
    #[arg(long, value_name = "T|F")]
    pub flag: String,

    /// x, y, z or all
    #[arg(long, value_name = "AXIS", default_value = "all")]
    pub axis: String,

    /// Output file (format chosen by name)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct FramesArgs {
    #[arg(value_name = "XDATCAR")]
    pub file: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}
