use crate::config::SimulationConfig;
use crate::engines::evaluation::sensory::{closest_target, wrap_angle};
use crate::engines::generation::layout::{InterfaceLayout, JOINTS_PER_SEGMENT};
use crate::error::{CurriculumError, Result};
use crate::types::{Observation, Point2, TargetRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{PI, TAU};

/// Physics collaborator consumed only through observations and actions
pub trait SimulationEnvironment {
    fn action_dim(&self) -> usize;
    fn reset(&mut self, seed: u64) -> Result<Observation>;
    fn step(&mut self, action: &[f64]) -> Result<Observation>;
    /// Current state without advancing the simulation
    fn observation(&self) -> Result<Observation>;
}

/// Map controller outputs in [-1, 1] onto joint angle targets
pub fn scale_actions_to_joint_limits(action: &[f64], joint_limit: f64) -> Vec<f64> {
    action
        .iter()
        .map(|a| a.clamp(-1.0, 1.0) * joint_limit)
        .collect()
}

/// Kinematic stand-in for the brittle-star body
///
/// Joints chase their commanded angle at a bounded rate. An in-plane sweep of a
/// segment whose out-of-plane joint presses down (negative angle) pushes the
/// disk along that arm's heading and twists it slightly; lifted segments barely
/// grip. Distal segments act on a longer lever.
pub struct PlanarDiskEnv {
    config: SimulationConfig,
    arm_count: usize,
    segment_count: usize,
    joints: Vec<f64>,
    disk_position: Point2,
    disk_rotation: f64,
    targets: Vec<TargetRecord>,
}

impl PlanarDiskEnv {
    const LIFTED_GRIP: f64 = 0.1;

    pub fn new(layout: &InterfaceLayout, config: SimulationConfig) -> Self {
        Self {
            joints: vec![0.0; layout.outputs().len()],
            arm_count: layout.arm_count(),
            segment_count: layout.segment_count(),
            config,
            disk_position: [0.0, 0.0],
            disk_rotation: 0.0,
            targets: Vec::new(),
        }
    }
}

impl SimulationEnvironment for PlanarDiskEnv {
    fn action_dim(&self) -> usize {
        self.joints.len()
    }

    fn reset(&mut self, seed: u64) -> Result<Observation> {
        let mut rng = StdRng::seed_from_u64(seed);
        let angle: f64 = rng.gen_range(0.0..TAU);
        let distance = self.config.target_distance;

        self.joints.iter_mut().for_each(|j| *j = 0.0);
        self.disk_position = [0.0, 0.0];
        self.disk_rotation = 0.0;
        self.targets = (0..self.config.target_count)
            .map(|i| {
                let heading = angle + PI * i as f64;
                TargetRecord::new(distance * heading.cos(), distance * heading.sin())
            })
            .collect();

        self.observation()
    }

    fn step(&mut self, action: &[f64]) -> Result<Observation> {
        if action.len() != self.joints.len() {
            return Err(CurriculumError::Simulation(format!(
                "expected {} actions, got {}",
                self.joints.len(),
                action.len()
            )));
        }
        if self.targets.is_empty() {
            return Err(CurriculumError::Simulation(
                "step called before reset".to_string(),
            ));
        }

        let commanded = scale_actions_to_joint_limits(action, self.config.joint_limit);
        let max_delta = self.config.max_joint_delta;
        let mut deltas = vec![0.0; self.joints.len()];
        for ((joint, delta), target) in self.joints.iter_mut().zip(&mut deltas).zip(commanded) {
            *delta = (target - *joint).clamp(-max_delta, max_delta);
            *joint += *delta;
        }

        let mut push = [0.0, 0.0];
        let mut twist = 0.0;
        for arm in 0..self.arm_count {
            let heading = self.disk_rotation + TAU * arm as f64 / self.arm_count as f64;
            for segment in 0..self.segment_count {
                let base = (arm * self.segment_count + segment) * JOINTS_PER_SEGMENT;
                let (sweep, lift) = (deltas[base], self.joints[base + 1]);
                let grip = if lift < 0.0 { 1.0 } else { Self::LIFTED_GRIP };
                let lever = (segment + 1) as f64;

                let stroke = -sweep * grip * lever * self.config.stroke_gain;
                push[0] += stroke * heading.cos();
                push[1] += stroke * heading.sin();
                twist += sweep * grip * self.config.turn_gain;
            }
        }

        self.disk_position[0] += push[0];
        self.disk_position[1] += push[1];
        self.disk_rotation = wrap_angle(self.disk_rotation + twist);

        self.observation()
    }

    fn observation(&self) -> Result<Observation> {
        let (distance, _) = closest_target(self.disk_position, &self.targets)?;
        Ok(Observation {
            joint_positions: self.joints.clone(),
            disk_position: self.disk_position,
            disk_rotation: self.disk_rotation,
            targets: self.targets.clone(),
            xy_distance_to_target: distance,
        })
    }
}
