use crate::types::Arity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurriculumError {
    #[error("Structural mismatch: expected arity {expected}, got {found}")]
    StructuralMismatch { expected: Arity, found: Arity },

    /// A structural mismatch in which the requested arity is smaller than the
    /// source's. Match on `is_structural()` to catch both kinds.
    #[error("Arity may not shrink across a stage transition: {from} -> {to}")]
    ArityShrink { from: Arity, to: Arity },

    #[error("Invalid genome: {0}")]
    InvalidGenome(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Stage {stage} ({segment_count} segments per arm) failed: {source}")]
    StageFailed {
        stage: usize,
        segment_count: usize,
        #[source]
        source: Box<CurriculumError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CurriculumError {
    /// True for both flavours of interface contract violation.
    pub fn is_structural(&self) -> bool {
        match self {
            CurriculumError::StructuralMismatch { .. } | CurriculumError::ArityShrink { .. } => true,
            CurriculumError::StageFailed { source, .. } => source.is_structural(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurriculumError>;
