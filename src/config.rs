use crate::{
    constants::{MAX_DEBUG_LEVEL, MAX_FORMATS, MAX_LEAD_IN_FRAMES},
    error::{Error, Result},
    format::SampleFormat,
};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::read_to_string;

fn default_clear_on_drop() -> bool {
    true
}

/// Plugin options, as written in the `Config.toml` handed to the player.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the named pipe receiving PCM
    pub fifo: PathBuf,

    /// Diagnostic verbosity, clamped into 0..=127
    #[serde(default)]
    pub debug: i64,

    /// Discard bytes still sitting in the fifo when the stream stops
    #[serde(default = "default_clear_on_drop")]
    pub clear_on_drop: bool,

    /// Frames of silence written when the stream starts
    #[serde(default)]
    pub lead_in_frames: u32,

    #[serde(default)]
    pub formats: Vec<SampleFormat>,

    /// Union the default format list into `formats`
    #[serde(default)]
    pub format_append: bool,

    #[serde(default, skip_serializing)]
    pub comment: Option<toml::Value>,

    #[serde(default, skip_serializing)]
    pub hint: Option<toml::Value>,

    #[serde(default, rename = "type", skip_serializing)]
    pub kind: Option<String>,
}

impl Config {
    pub fn new(fifo: impl Into<PathBuf>) -> Self {
        Config {
            fifo: fifo.into(),
            debug: 0,
            clear_on_drop: default_clear_on_drop(),
            lead_in_frames: 0,
            formats: Vec::new(),
            format_append: false,
            comment: None,
            hint: None,
            kind: None,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Config> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fifo.as_os_str().is_empty() {
            return Err(Error::Config(
                "a fifo location must be provided".to_string(),
            ));
        }

        if self.lead_in_frames > MAX_LEAD_IN_FRAMES {
            return Err(Error::Config(format!(
                "lead_in_frames must be between 0 and {MAX_LEAD_IN_FRAMES}"
            )));
        }

        if self.formats.len() > MAX_FORMATS {
            return Err(Error::Config("too many formats declared".to_string()));
        }

        let resolved = self.resolved_formats();
        if resolved.len() > MAX_FORMATS {
            return Err(Error::Config(format!(
                "too many sample formats specified ({} > {MAX_FORMATS})",
                resolved.len()
            )));
        }

        Ok(())
    }

    fn resolved_formats(&self) -> Vec<SampleFormat> {
        let mut formats = Vec::with_capacity(self.formats.len() + SampleFormat::DEFAULTS.len());

        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }

        if self.formats.is_empty() || self.format_append {
            for format in SampleFormat::DEFAULTS {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
        }

        formats
    }

    /// Sample formats declared to the host, explicit ones first.
    pub fn formats(&self) -> Vec<SampleFormat> {
        self.resolved_formats()
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::new(self.debug)
    }
}

/// Clamped `debug` level. Nothing is logged by the engine at level 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub fn new(level: i64) -> Self {
        Verbosity(level.clamp(0, MAX_DEBUG_LEVEL) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Lifecycle events and failures
    pub fn enabled(self) -> bool {
        self.0 > 0
    }

    /// Per-call transfer, pointer and poll decisions
    pub fn detailed(self) -> bool {
        self.0 >= 2
    }

    /// Default log filter for a process running at this verbosity.
    pub fn log_filter(self) -> LevelFilter {
        match self.0 {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub async fn load(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = read_to_string(path)
        .await
        .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

    Config::from_toml_str(&config)
}
