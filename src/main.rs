use std::{panic, path::Path, process::ExitCode};

use anyhow::{Context, Error};
use clap::Parser;
use log::{error, info};

use stagehand::{
    cli::{Cli, Commands, OutputFormat},
    engine, validation,
};
use stagehand_api::{
    config::BuildConfiguration,
    error::{InternalError, InvalidInputError, ReportError, StagehandError, StagehandResultExt},
};

fn generate(
    config: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), StagehandError> {
    let config = BuildConfiguration::from_file(config)?;
    let manifest = engine::gen_image_stages(&config)?;

    let rendered = match format {
        OutputFormat::Json => manifest.to_json()?,
        OutputFormat::Yaml => manifest.to_yaml()?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered).structured(InvalidInputError::WriteOutput {
                path: path.to_string_lossy().to_string(),
            })?;
            info!("Manifest written to '{}'", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn write_error(path: &Path, e: &StagehandError) {
    if let Err(e2) = std::fs::write(path, serde_yaml::to_string(e).unwrap_or_default()) {
        error!("Failed to write error to file: {e2}");
    }
}

fn run_stagehand(args: &Cli) -> Result<(), StagehandError> {
    info!("Stagehand version: {}", stagehand::STAGEHAND_VERSION);

    let res = panic::catch_unwind(|| match &args.command {
        Commands::Validate { config } => validation::validate_build_config_file(config),
        Commands::Generate {
            config,
            output,
            format,
            error,
        } => {
            let res = generate(config, output.as_deref(), *format);

            // return error if requested
            if let (Some(error_path), Err(e)) = (error.as_ref(), &res) {
                write_error(error_path, e);
            }

            res
        }
    });

    match res {
        Err(e) => Err(StagehandError::new(InternalError::Panic(format!("{e:?}")))),
        Ok(r) => r.message(format!("Failed to execute '{}' command", args.command)),
    }
}

fn setup_logging(args: &Cli) -> Result<(), Error> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(args.verbosity)
        .try_init()
        .context("Logger already registered")
}

fn main() -> ExitCode {
    // Parse args
    let args = Cli::parse();

    // Initialize the logger
    if let Err(e) = setup_logging(&args) {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::from(1);
    }

    if let Err(e) = run_stagehand(&args) {
        error!("Stagehand failed: {e:?}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
