use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::STAGEHAND_VERSION;

#[derive(Parser, Debug)]
#[clap(version = STAGEHAND_VERSION)]
pub struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(global = true, short, long, default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Serialization format of the generated manifest
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the device, mount and copy stages of a disk image
    Generate {
        /// Path to the build configuration
        #[clap(index = 1)]
        config: PathBuf,

        /// Path to save the manifest to, instead of standard output
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Format of the manifest
        #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Path to save an eventual fatal error
        #[clap(short, long)]
        error: Option<PathBuf>,
    },

    /// Validate the provided build configuration
    ///
    /// The configuration is loaded and every stage is generated, without
    /// writing anything.
    Validate {
        /// Path to the build configuration
        #[clap(index = 1)]
        config: PathBuf,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Generate { .. } => "generate",
            Commands::Validate { .. } => "validate",
        }
    }
}

impl Display for Commands {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}
