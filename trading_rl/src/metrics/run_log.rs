//! Files describing one training run.
//!
//! ```text
//! <dir>/Parameters.txt     hyperparameters, start and end timestamps
//! <dir>/log.txt            one line per tagged model save
//! <dir>/agent_config.json  the AgentConfig needed to rebuild the agent
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::AgentConfig;
use crate::error::AgentError;

const PARAMETERS_FILE: &str = "Parameters.txt";
const SAVE_LOG_FILE: &str = "log.txt";
const AGENT_CONFIG_FILE: &str = "agent_config.json";

/// Where a run writes its files and how its model is described.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLogConfig {
    pub dir: PathBuf,
    /// Free-form model description written to `Parameters.txt`.
    pub model: String,
}

impl RunLogConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            model: String::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Run-level values that are not part of [`AgentConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParameters {
    pub initial_balance: f64,
    pub episodes: usize,
    pub normalize_value: f64,
}

/// Open run directory.
#[derive(Debug, Clone)]
pub struct RunLog {
    config: RunLogConfig,
}

impl RunLog {
    /// Create the run directory and write the start-of-run files.
    pub fn create(
        config: RunLogConfig,
        agent: &AgentConfig,
        params: &RunParameters,
    ) -> Result<Self, AgentError> {
        fs::create_dir_all(&config.dir)?;

        let mut file = File::create(config.dir.join(PARAMETERS_FILE))?;
        writeln!(file, "training start: {}", timestamp())?;
        writeln!(file, "initial_balance: {}", params.initial_balance)?;
        writeln!(file, "training episodes: {}", params.episodes)?;
        writeln!(file, "lookback_window_size: {}", agent.lookback_window_size)?;
        writeln!(file, "lr: {}", agent.learning_rate)?;
        writeln!(file, "epochs: {}", agent.epochs)?;
        writeln!(file, "batch size: {}", agent.batch_size)?;
        writeln!(file, "normalize_value: {}", params.normalize_value)?;
        writeln!(file, "model: {}", config.model)?;

        let json = serde_json::to_string_pretty(agent)?;
        fs::write(config.dir.join(AGENT_CONFIG_FILE), json)?;

        log::debug!("run log opened at {}", config.dir.display());
        Ok(Self { config })
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Append the end-of-training timestamp.
    pub fn end_training(&self) -> Result<(), AgentError> {
        let mut file = self.append(PARAMETERS_FILE)?;
        writeln!(file, "training end: {}", timestamp())?;
        Ok(())
    }

    /// Append `<time>, arg, arg, ...` to `log.txt`. Nothing is written for
    /// an empty argument list.
    pub fn log_save_args(&self, args: &[String]) -> Result<(), AgentError> {
        if args.is_empty() {
            return Ok(());
        }
        let line: String = args.iter().map(|a| format!(", {}", a)).collect();
        let mut file = self.append(SAVE_LOG_FILE)?;
        writeln!(file, "{}{}", Local::now().format("%Y-%m-%d %H:%M:%S"), line)?;
        Ok(())
    }

    /// Read back the agent configuration stored in a run directory.
    pub fn load_agent_config(dir: impl AsRef<Path>) -> Result<AgentConfig, AgentError> {
        let json = fs::read_to_string(dir.as_ref().join(AGENT_CONFIG_FILE))?;
        let config: AgentConfig = serde_json::from_str(&json)?;
        Ok(config.build()?)
    }

    fn append(&self, file: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.dir.join(file))
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}
