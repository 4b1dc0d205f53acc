use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use yag_store::ObjectKind;

#[derive(Parser)]
#[command(
    name = "yag",
    about = "yag: a content-addressed object store in the shape of a git repository",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Compute an object id from a file, optionally storing the object
    HashObject(HashObjectArgs),
    /// Print the payload of a stored object
    CatFile(CatFileArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the object into the repository
    #[arg(short = 'w')]
    pub write: bool,
    /// Object type
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectKind,
    /// File to read the payload from
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Expected object type
    pub kind: ObjectKind,
    /// Object id, abbreviation, ref or branch/tag name
    pub object: String,
}
