use crate::config::loader::{load_config, load_config_file};
use crate::config::schema::Config;
use crate::error::{CliError, CliResult, ConfigError, ConfigResult};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

/// What happens when a destination file already exists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    #[default]
    Overwrite,
    Error,
}

/// What a batch copy does after one source fails.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Stop at the first failing source.
    #[default]
    FailFast,
    /// Attempt every source, then report all failures together.
    ContinueOnError,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "treecp", version = env!("CARGO_PKG_VERSION"))]
pub struct CLIArgs {
    #[arg(
        value_name = "PATHS",
        help = "Source file(s) or directory(ies), followed by the destination unless -t is given",
        required = true
    )]
    pub paths: Vec<PathBuf>,

    #[arg(
        short = 't',
        long = "target-directory",
        value_name = "DIRECTORY",
        help = "copy all SOURCE arguments into DIRECTORY"
    )]
    pub target_directory: Option<PathBuf>,

    #[arg(
        short = 'j',
        long = "parallel",
        value_name = "N",
        help = "Number of workers copying sibling entries (0 = one per CPU)"
    )]
    pub parallel: Option<usize>,

    #[arg(
        short = 'n',
        long = "no-clobber",
        help = "fail instead of overwriting an existing file"
    )]
    pub no_clobber: bool,

    #[arg(
        short = 'k',
        long = "keep-going",
        help = "keep copying the remaining sources after one fails"
    )]
    pub keep_going: bool,

    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[arg(short = 'q', long, help = "Only log errors")]
    pub quiet: bool,

    #[arg(long, value_name = "PATH", help = "Use custom config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Ignore all config files")]
    pub no_config: bool,
}

#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub parallel: usize,
    pub overwrite: OverwritePolicy,
    pub on_error: BatchPolicy,
}

impl CopyOptions {
    pub fn none() -> Self {
        Self {
            parallel: 1,
            overwrite: OverwritePolicy::Overwrite,
            on_error: BatchPolicy::FailFast,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            parallel: config.copy.parallel,
            overwrite: if config.copy.no_clobber {
                OverwritePolicy::Error
            } else {
                OverwritePolicy::Overwrite
            },
            on_error: if config.copy.keep_going {
                BatchPolicy::ContinueOnError
            } else {
                BatchPolicy::FailFast
            },
        }
    }

    /// Worker count with `0` resolved to the number of CPUs.
    pub fn effective_parallel(&self) -> usize {
        if self.parallel == 0 {
            num_cpus::get()
        } else {
            self.parallel
        }
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self::none()
    }
}

/// Fully resolved invocation: what to copy, where, and how to log it.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    /// Sources go into `destination` as a batch rather than a single copy.
    pub batch: bool,
    pub options: CopyOptions,
    pub log_level: Level,
}

impl CLIArgs {
    pub fn validate(self) -> CliResult<Invocation> {
        let config = load_config_if_needed(&self)?;

        let mut options = if let Some(ref cfg) = config {
            CopyOptions::from_config(cfg)
        } else {
            CopyOptions::none()
        };
        apply_cli_overrides(&mut options, &self);

        let config_level = match config {
            Some(ref cfg) => parse_log_level(&cfg.log.level)?,
            None => Level::WARN,
        };
        let log_level = self.log_level(config_level);

        let (sources, destination, batch) = match self.target_directory {
            Some(target) => (self.paths, target, true),
            None => {
                let mut sources = self.paths;
                let destination = match sources.pop() {
                    Some(destination) if !sources.is_empty() => destination,
                    _ => {
                        return Err(CliError::Validation(
                            "missing destination operand after the source".to_string(),
                        ));
                    }
                };
                let batch = sources.len() > 1;
                (sources, destination, batch)
            }
        };

        Ok(Invocation {
            sources,
            destination,
            batch,
            options,
            log_level,
        })
    }

    fn log_level(&self, configured: Level) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => configured,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn load_config_if_needed(args: &CLIArgs) -> ConfigResult<Option<Config>> {
    if args.no_config {
        return Ok(None);
    }

    if let Some(custom_path) = &args.config {
        return Ok(Some(load_config_file(custom_path)?));
    }

    Ok(Some(load_config()?))
}

fn apply_cli_overrides(options: &mut CopyOptions, args: &CLIArgs) {
    if let Some(parallel) = args.parallel {
        options.parallel = parallel;
    }
    if args.no_clobber {
        options.overwrite = OverwritePolicy::Error;
    }
    if args.keep_going {
        options.on_error = BatchPolicy::ContinueOnError;
    }
}

pub fn parse_log_level(level: &str) -> ConfigResult<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|e| ConfigError::InvalidValue {
            key: "log.level".to_string(),
            message: format!("'{}': {}", level, e),
        })
}
