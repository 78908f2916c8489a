mod cli;

use std::io::Write;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use sd_metadata::{OutputFormat, OutputOptions, Package, ParseOptions};

fn read_input(input: &str) -> anyhow::Result<String> {
    if input.starts_with("http://") || input.starts_with("https://") {
        info!("fetching {input}");
        let text = reqwest::blocking::get(input)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("fetching {input}"))?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("structdoc", level)
        .filter_module("sd_metadata", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    // Reject the format before doing any work.
    let format: OutputFormat = cli.format.parse()?;

    let text = read_input(&cli.input)?;
    let package = Package::parse(&text).with_context(|| format!("parsing {}", cli.input))?;
    if package.declarations.is_empty() {
        bail!("no type declarations found in {}", cli.input);
    }

    let options = ParseOptions::from_suffix_list(cli.ignore_struct_suffix.as_deref().unwrap_or(""));
    let metadata = sd_metadata::build(&package.declarations, &options)?;
    let output = sd_metadata::emit(&metadata, &OutputOptions { format })?;

    match cli.output {
        Some(path) => std::fs::write(&path, output)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout()
            .write_all(&output)
            .context("writing stdout")?,
    }
    Ok(())
}
