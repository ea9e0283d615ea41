use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge per-package metadata into a new catalog
    #[command(arg_required_else_help = true)]
    Build {
        /// Checkout of the metadata repository
        #[arg(required = true, value_hint = ValueHint::DirPath)]
        metadata_root: PathBuf,

        /// Previously published catalog
        #[arg(required = false, long, default_value = "packages.json", value_hint = ValueHint::FilePath)]
        catalog: PathBuf,

        /// Where to write the new catalog
        #[arg(required = false, short, long, default_value = "artifacts/packages.json", value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Publish changed artifacts to the index repository
    Update {
        /// Repository descriptor tracking the published artifacts
        #[arg(required = false, long, default_value = "repository.json", value_hint = ValueHint::FilePath)]
        descriptor: PathBuf,

        /// Directory holding packages.json and resources.zip
        #[arg(required = false, long, default_value = "artifacts", value_hint = ValueHint::DirPath)]
        artifacts: PathBuf,

        /// Metadata revision to quote in the commit message
        #[arg(required = false, long, conflicts_with = "reference_file")]
        reference: Option<String>,

        /// File whose first line is the metadata revision
        #[arg(required = false, long, default_value = "artifacts/metadata_commit.txt", value_hint = ValueHint::FilePath)]
        reference_file: PathBuf,

        /// Apply the commit to a local checkout instead of the remote API
        #[arg(required = false, long, value_hint = ValueHint::DirPath)]
        local: Option<PathBuf>,

        /// Rewrite the local descriptor after a successful commit
        #[arg(required = false, long)]
        write_back: bool,

        /// Give up on the commit request after this many seconds
        #[arg(required = false, long)]
        timeout: Option<u64>,
    },
}
