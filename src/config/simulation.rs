use super::traits::{invalid, ConfigSection};
use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Control steps per rollout
    pub max_steps: usize,
    pub target_distance: f64,
    /// 1 for directed locomotion, 2 to place a second candidate target
    pub target_count: usize,
    pub target_reached_threshold: f64,
    /// Joint angle limit in radians; actions in [-1, 1] scale to it
    pub joint_limit: f64,
    /// Largest joint angle change per control step
    pub max_joint_delta: f64,
    pub stroke_gain: f64,
    pub turn_gain: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: 200,
            target_distance: 3.0,
            target_count: 1,
            target_reached_threshold: 0.2,
            joint_limit: 0.5,
            max_joint_delta: 0.1,
            stroke_gain: 0.05,
            turn_gain: 0.02,
            seed: 0,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), CurriculumError> {
        let name = Self::section_name();
        if self.max_steps == 0 {
            return Err(invalid(name, "max_steps must be at least 1"));
        }
        if !(1..=2).contains(&self.target_count) {
            return Err(invalid(name, "target_count must be 1 or 2"));
        }
        if self.target_distance <= 0.0 {
            return Err(invalid(name, "target_distance must be positive"));
        }
        if self.joint_limit <= 0.0 || self.max_joint_delta <= 0.0 {
            return Err(invalid(name, "joint_limit and max_joint_delta must be positive"));
        }
        Ok(())
    }
}
