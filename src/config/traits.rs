use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), CurriculumError>;
}

pub(crate) fn invalid(section: &str, message: &str) -> CurriculumError {
    CurriculumError::Configuration(format!("[{}] {}", section, message))
}
