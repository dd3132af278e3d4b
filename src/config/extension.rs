use super::traits::{invalid, ConfigSection};
use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};

/// Fixed initial weights used when grafting new interface nodes onto a genome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionPolicy {
    /// Weight from the target-direction input into each new output
    pub new_output_weight: f64,
    /// Weight from each new joint input into the new output of the same joint
    pub new_input_weight: f64,
    pub connect_new_inputs: bool,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self {
            new_output_weight: 0.05,
            new_input_weight: 0.0,
            connect_new_inputs: true,
        }
    }
}

impl ConfigSection for ExtensionPolicy {
    fn section_name() -> &'static str {
        "extension"
    }

    fn validate(&self) -> Result<(), CurriculumError> {
        if !self.new_output_weight.is_finite() || !self.new_input_weight.is_finite() {
            return Err(invalid(Self::section_name(), "weights must be finite"));
        }
        if self.new_output_weight.abs() > 1.0 || self.new_input_weight.abs() > 1.0 {
            return Err(invalid(
                Self::section_name(),
                "initial weights must stay within [-1, 1]",
            ));
        }
        Ok(())
    }
}
