pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use engines::curriculum::{CurriculumOrchestrator, CurriculumReport, LocomotionStageBuilder, TrainingResult};
pub use engines::generation::{Genome, GenomeExtender};
pub use error::{CurriculumError, Result};
pub use types::{Arity, CurriculumMode};
