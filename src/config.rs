use crate::simulator::memory::DEFAULT_MEMORY_SIZE;
use crate::simulator::SimulatorConfig;
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::io;
use thiserror::Error;

/// Settings are read from this file in the working directory, if it exists
pub const CONFIG_FILE: &str = "ezasm.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {}", CONFIG_FILE.bright_yellow(), .0)]
    Read(#[from] io::Error),

    #[error("Failed to parse {}: {}", CONFIG_FILE.bright_yellow(), .0)]
    Parse(#[from] toml::de::Error),

    #[error("No file specified")]
    NoFile,
}

/// Every setting is optional here, so the config file and the command line can each set some
/// of them. See [`Config`] for the defaults.
#[derive(Parser, Deserialize, Debug, Default)]
#[command(author, version, about)]
#[clap(disable_help_flag = true)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptionalConfig {
    #[clap(long, action = clap::ArgAction::HelpLong)]
    #[serde(skip)]
    help: Option<bool>,

    /// Reads instructions from stdin and runs each one as soon as it's entered
    #[arg(short, long)]
    pub interactive: bool,

    /// Runs the program one line at a time, stepping whenever Enter is pressed
    #[arg(short, long)]
    pub step: bool,

    /// Bytes of memory available to the program. Defaults to 65536
    #[arg(short, long)]
    pub memory_size: Option<usize>,

    /// Prints the registers after execution
    #[arg(long)]
    pub print_state: bool,

    /// Prints the parsed program before running it
    #[arg(long)]
    pub print_program: bool,

    /// Log filter, such as `warn` or `ezasm=trace`. `RUST_LOG` takes precedence. Defaults to `warn`
    #[arg(long)]
    pub log: Option<String>,

    /// The EzASM file to execute
    pub file: Option<String>,
}

impl OptionalConfig {
    pub fn get_args() -> Self {
        Self::parse()
    }

    /// Reads [`CONFIG_FILE`]. A missing file is the same as an empty one.
    pub fn get_toml() -> Result<Self, ConfigError> {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(config) => Self::from_toml(&config),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(config: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config)?)
    }

    /// Settings in `rhs` override the ones in `self`
    pub fn merge(self, rhs: Self) -> Self {
        Self {
            help: rhs.help.or(self.help),
            interactive: self.interactive || rhs.interactive,
            step: self.step || rhs.step,
            memory_size: rhs.memory_size.or(self.memory_size),
            print_state: self.print_state || rhs.print_state,
            print_program: self.print_program || rhs.print_program,
            log: rhs.log.or(self.log),
            file: rhs.file.or(self.file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: Option<String>,
    pub interactive: bool,
    pub step: bool,
    pub memory_size: usize,
    pub print_state: bool,
    pub print_program: bool,
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        OptionalConfig::default().into()
    }
}

impl From<OptionalConfig> for Config {
    fn from(config: OptionalConfig) -> Self {
        Self {
            file: config.file,
            interactive: config.interactive,
            step: config.step,
            memory_size: config.memory_size.unwrap_or(DEFAULT_MEMORY_SIZE),
            print_state: config.print_state,
            print_program: config.print_program,
            log: config.log.unwrap_or_else(|| "warn".to_string()),
        }
    }
}

impl Config {
    /// Merges the config file with the command line, the command line taking precedence.
    /// Only interactive sessions may go without a file.
    pub fn get() -> Result<Self, ConfigError> {
        let config: Self = OptionalConfig::get_toml()?
            .merge(OptionalConfig::get_args())
            .into();

        if config.file.is_none() && !config.interactive {
            return Err(ConfigError::NoFile);
        }
        Ok(config)
    }

    pub fn simulator(&self) -> SimulatorConfig {
        SimulatorConfig {
            memory_size: self.memory_size,
        }
    }
}
