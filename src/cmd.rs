use clap::Parser;

use crate::config::LoaderConfig;

use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "stiffrs",
    about = "Interactive stiffness extraction from four-point bending workbooks",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Workbook to load; when omitted a file dialog opens in the UI
    #[arg(value_name = "WORKBOOK")]
    pub workbook: Option<PathBuf>,

    /// Loader configuration JSON (compiled-in defaults when omitted)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the exported CSV and plot images
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Also write one PNG per confirmed sample on export
    #[arg(long = "save-plots")]
    pub save_plots: bool,

    /// Override the sheet-name pattern from the loader configuration
    #[arg(long = "pattern", value_name = "REGEX")]
    pub pattern: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum CmdError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Msg(String),
}

/// Runtime configuration resolved from the CLI flags.
pub struct RunConfig {
    pub workbook: Option<PathBuf>,
    pub loader: LoaderConfig,
    pub out_dir: PathBuf,
    pub save_plots: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, CmdError> {
        let mut loader = match &self.config {
            Some(path) => LoaderConfig::load_from_file(path).map_err(|e| {
                CmdError::Msg(format!("failed to load config '{}': {}", path.display(), e))
            })?,
            None => LoaderConfig::default(),
        };

        if let Some(pattern) = self.pattern {
            loader.sheet_pattern = pattern;
        }
        loader
            .sheet_regex()
            .map_err(|e| CmdError::Msg(format!("invalid sheet pattern: {e}")))?;

        Ok(RunConfig {
            workbook: self.workbook,
            loader,
            out_dir: self.out_dir,
            save_plots: self.save_plots,
        })
    }
}
