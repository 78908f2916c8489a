use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The declarations document, as a file or URL")]
    pub input: String,

    #[arg(short, long, help = "Write to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        default_value = "tsv",
        help = "Output format: full (tsv), short (tsvshort) or json"
    )]
    pub format: String,

    #[arg(
        long,
        value_name = "SUFFIXES",
        help = "Comma-separated struct name suffixes to leave out"
    )]
    pub ignore_struct_suffix: Option<String>,

    #[arg(short, long, help = "Log debug output to stderr")]
    pub verbose: bool,
}
