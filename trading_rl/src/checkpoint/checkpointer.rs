//! Binary checkpoints for actor and critic parameters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use thiserror::Error;

/// Extension appended by the recorder.
const EXTENSION: &str = "bin";

/// Error type for checkpointing operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// IO error during save/load.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Burn recorder error.
    #[error("Recorder error: {0}")]
    Recorder(String),
    /// The requested checkpoint file does not exist.
    #[error("checkpoint not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Which network a checkpoint file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Actor,
    Critic,
    /// A single network serving as both actor and critic.
    Shared,
}

impl ModelRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelRole::Actor => "Actor",
            ModelRole::Critic => "Critic",
            ModelRole::Shared => "Shared",
        }
    }
}

/// Reads and writes network parameters in one directory.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
}

impl Checkpointer {
    /// Create a checkpointer, creating the directory if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Checkpointer over an existing directory, for loading.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a model: `{score}_{name}_{Role}` or `{name}_{Role}`.
    pub fn file_stem(name: &str, score: Option<&str>, role: ModelRole) -> String {
        match score {
            Some(score) => format!("{}_{}_{}", score, name, role.as_str()),
            None => format!("{}_{}", name, role.as_str()),
        }
    }

    /// Full path of a checkpoint file, extension included.
    ///
    /// Score tags contain a dot, so the extension is appended rather than set.
    pub fn path_for(&self, name: &str, score: Option<&str>, role: ModelRole) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::file_stem(name, score, role), EXTENSION))
    }

    /// Save a module.
    pub fn save_module<B: Backend, M: Module<B>>(
        &self,
        module: &M,
        name: &str,
        score: Option<&str>,
        role: ModelRole,
    ) -> Result<PathBuf, CheckpointError> {
        let path = self.path_for(name, score, role);
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        module
            .clone()
            .save_file(path.clone(), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        log::debug!("saved {} parameters to {}", role.as_str(), path.display());
        Ok(path)
    }

    /// Load a module into `template`.
    ///
    /// `name` is the full prefix written at save time, score tag included.
    pub fn load_module<B: Backend, M: Module<B>>(
        &self,
        template: M,
        name: &str,
        role: ModelRole,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let path = self.path_for(name, None, role);
        if !path.exists() {
            return Err(CheckpointError::NotFound(path));
        }
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        template
            .load_file(path, &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))
    }
}
