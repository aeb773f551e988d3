use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "xtalint - enumerate the chain-chain interfaces of a crystal structure and measure their buried surface areas.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of worker threads for surface-area calculations.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate all chain-chain interfaces of the crystal and compute their buried areas.
    Interfaces(InterfacesArgs),
    /// Compute per-residue accessible surface areas of the isolated chains.
    Surface(SurfaceArgs),
}

/// Options shared by every command that computes surface areas.
#[derive(Args, Debug, Clone, Default)]
pub struct SurfaceOptions {
    /// Probe radius in Angstroms.
    #[arg(long = "probe", value_name = "FLOAT")]
    pub probe_radius: Option<f64>,

    /// Number of test points on each atom sphere.
    #[arg(long, value_name = "INT")]
    pub sphere_points: Option<usize>,

    /// Include hydrogen atoms in contacts and surface areas.
    #[arg(long)]
    pub include_hydrogens: bool,

    /// Include ligands, nucleic acids and hetero residues alongside protein chains.
    #[arg(long)]
    pub include_non_polymer: bool,
}

/// Arguments for the `interfaces` subcommand.
#[derive(Args, Debug)]
pub struct InterfacesArgs {
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the interface summary as CSV.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write per-residue buried areas of every interface as CSV.
    #[arg(long, value_name = "PATH")]
    pub residues: Option<PathBuf>,

    /// Maximum atom-atom distance for a contact, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Number of neighbouring unit cells searched in each direction.
    #[arg(long = "shell", value_name = "INT")]
    pub shell_radius: Option<u32>,

    /// Override the space group read from the CRYST1 record.
    #[arg(long, value_name = "SYMBOL")]
    pub space_group: Option<String>,

    /// Disable the skipping of symmetry-redundant transforms.
    #[arg(long)]
    pub no_redundancy_elimination: bool,

    #[command(flatten)]
    pub surface: SurfaceOptions,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.cutoff=4.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `surface` subcommand.
#[derive(Args, Debug)]
pub struct SurfaceArgs {
    /// Path to the input PDB file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write per-residue surface areas as CSV.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub surface: SurfaceOptions,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
