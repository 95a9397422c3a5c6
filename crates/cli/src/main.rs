use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use rst2rfcxml_core::{ConvertError, ConvertOptions, convert_files};

mod cli;
use cli::Cli;

fn load_options(path: Option<&Path>) -> Result<ConvertOptions, String> {
    let Some(path) = path else {
        log::debug!("Using default options");
        return Ok(ConvertOptions::default());
    };
    log::debug!("Using options from: {}", path.display());
    let json = fs::read_to_string(path)
        .map_err(|e| format!("can't read config {}: {}", path.display(), e))?;
    ConvertOptions::from_json(&json).map_err(|e: ConvertError| format!("{}: {}", path.display(), e))
}

fn run(cli: Cli) -> Result<(), String> {
    let mut options = load_options(cli.config.as_deref())?;
    if let Some(uri) = cli.base_target_uri {
        options.base_target_uri = Some(uri);
    }

    let conversion = convert_files(&cli.inputs, options).map_err(|e| e.to_string())?;
    if conversion.diagnostics.has_warnings() {
        log::info!("{} warning(s)", conversion.diagnostics.count());
    }

    match &cli.output {
        Some(path) => fs::write(path, conversion.xml)
            .map_err(|e| format!("can't write {}: {}", path.display(), e)),
        None => {
            print!("{}", conversion.xml);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}
