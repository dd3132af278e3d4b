use super::traits::{invalid, ConfigSection};
use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumConfig {
    pub arm_count: usize,
    pub start_segments: usize,
    pub max_segments: usize,
    /// Directory receiving the per-stage elite genomes; `None` disables saving
    pub output_dir: Option<PathBuf>,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            arm_count: 5,
            start_segments: 1,
            max_segments: 5,
            output_dir: Some(PathBuf::from("models")),
        }
    }
}

impl ConfigSection for CurriculumConfig {
    fn section_name() -> &'static str {
        "curriculum"
    }

    fn validate(&self) -> Result<(), CurriculumError> {
        let name = Self::section_name();
        if self.arm_count == 0 {
            return Err(invalid(name, "arm_count must be at least 1"));
        }
        if self.start_segments == 0 {
            return Err(invalid(name, "start_segments must be at least 1"));
        }
        if self.max_segments < self.start_segments {
            return Err(invalid(name, "max_segments must not be below start_segments"));
        }
        Ok(())
    }
}
