use crate::config::SimulationConfig;
use crate::engines::evaluation::environment::{PlanarDiskEnv, SimulationEnvironment};
use crate::engines::evaluation::network::Network;
use crate::engines::evaluation::sensory::SensoryEncoder;
use crate::engines::generation::layout::InterfaceLayout;
use crate::error::{CurriculumError, Result};
use crate::types::Arity;

/// Scores one compiled controller. Shared across evaluation threads.
pub trait FitnessEvaluator: Send + Sync {
    fn arity(&self) -> Arity;
    fn evaluate(&self, network: &Network) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutSummary {
    pub initial_distance: f64,
    pub min_distance: f64,
    pub final_distance: f64,
    pub steps: usize,
    pub reached: bool,
}

impl RolloutSummary {
    pub fn distance_improvement(&self) -> f64 {
        self.initial_distance - self.min_distance
    }
}

/// Directed locomotion: get the disk as close to the target as possible
pub struct LocomotionTask {
    config: SimulationConfig,
    encoder: SensoryEncoder,
}

impl LocomotionTask {
    pub fn new(layout: InterfaceLayout, config: SimulationConfig) -> Self {
        Self {
            config,
            encoder: SensoryEncoder::new(layout),
        }
    }

    pub fn rollout(&self, network: &Network) -> Result<RolloutSummary> {
        let mut env = PlanarDiskEnv::new(self.encoder.layout(), self.config.clone());
        if network.arity().outputs != env.action_dim() {
            return Err(CurriculumError::StructuralMismatch {
                expected: self.encoder.layout().arity(),
                found: network.arity(),
            });
        }
        let mut observation = env.reset(self.config.seed)?;

        let initial_distance = observation.xy_distance_to_target;
        let mut min_distance = initial_distance;
        let mut steps = 0;
        let mut reached = false;

        while steps < self.config.max_steps {
            let features = self.encoder.encode(&observation)?;
            let action = network.forward(&features)?;
            observation = env.step(&action)?;
            steps += 1;

            min_distance = min_distance.min(observation.xy_distance_to_target);
            if observation.xy_distance_to_target < self.config.target_reached_threshold {
                reached = true;
                break;
            }
        }

        Ok(RolloutSummary {
            initial_distance,
            min_distance,
            final_distance: observation.xy_distance_to_target,
            steps,
            reached,
        })
    }
}

impl FitnessEvaluator for LocomotionTask {
    fn arity(&self) -> Arity {
        self.encoder.layout().arity()
    }

    fn evaluate(&self, network: &Network) -> Result<f64> {
        Ok(self.rollout(network)?.distance_improvement())
    }
}
