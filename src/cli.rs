use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::provision::{DEFAULT_SEARCH_ID_MAX_LEN, MIN_SEARCH_ID_LEN};

#[derive(Parser, Debug)]
#[command(
    name = "lawnodes",
    version,
    about = "Convert statute text into provision-level JSONL records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Provisions,
    SearchIndex,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provisions => "provisions",
            Self::SearchIndex => "search-index",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long)]
    pub jobs: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Provisions)]
    pub format: OutputFormat,

    #[arg(
        long,
        default_value_t = DEFAULT_SEARCH_ID_MAX_LEN as u64,
        value_parser = clap::value_parser!(u64).range(MIN_SEARCH_ID_LEN as u64..)
    )]
    pub max_id_len: u64,

    #[arg(long, default_value_t = false)]
    pub strict_sub_items: bool,

    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
}
