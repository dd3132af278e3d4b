use crate::engines::generation::layout::{InterfaceLayout, TARGET_FEATURES};
use crate::error::{CurriculumError, Result};
use crate::types::{Arity, Observation, Point2, TargetRecord};
use std::f64::consts::{PI, TAU};

/// Distance to the nearest target and its index.
///
/// Ties go to the lowest index.
pub fn closest_target(disk_position: Point2, targets: &[TargetRecord]) -> Result<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    for (index, target) in targets.iter().enumerate() {
        let distance = distance_between(disk_position, target.position);
        match best {
            Some((best_distance, _)) if distance >= best_distance => {}
            _ => best = Some((distance, index)),
        }
    }
    best.ok_or_else(|| CurriculumError::Simulation("no targets to measure against".to_string()))
}

/// Signed angle in (-pi, pi] from the disk heading to the bearing of `target`.
///
/// A target sitting exactly on the disk has no bearing; the direction vector is
/// divided by 1 instead of 0 and the resulting angle carries no meaning.
pub fn direction_to_target(disk_position: Point2, disk_rotation: f64, target: &TargetRecord) -> f64 {
    let delta = [
        target.position[0] - disk_position[0],
        target.position[1] - disk_position[1],
    ];
    let distance = delta[0].hypot(delta[1]);
    if distance == 0.0 {
        log::trace!("target coincides with disk at {:?}; direction is arbitrary", disk_position);
    }
    let denominator = if distance > 0.0 { distance } else { 1.0 };
    let bearing = (delta[1] / denominator).atan2(delta[0] / denominator);

    wrap_angle(bearing - disk_rotation)
}

/// Wrap an angle into (-pi, pi]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

fn distance_between(a: Point2, b: Point2) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Joint positions in layout order, then the bearing of the closest target
#[derive(Debug, Clone)]
pub struct SensoryEncoder {
    layout: InterfaceLayout,
}

impl SensoryEncoder {
    pub fn new(layout: InterfaceLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &InterfaceLayout {
        &self.layout
    }

    pub fn feature_count(&self) -> usize {
        self.layout.arity().inputs
    }

    /// Target-relative features: the direction to the closest target
    pub fn encode_target(
        &self,
        disk_position: Point2,
        disk_rotation: f64,
        targets: &[TargetRecord],
    ) -> Result<[f64; TARGET_FEATURES]> {
        let (_, index) = closest_target(disk_position, targets)?;
        Ok([direction_to_target(disk_position, disk_rotation, &targets[index])])
    }

    /// Full feature vector for one observation
    pub fn encode(&self, observation: &Observation) -> Result<Vec<f64>> {
        let joints = self.layout.outputs().len();
        if observation.joint_positions.len() != joints {
            return Err(CurriculumError::StructuralMismatch {
                expected: self.layout.arity(),
                found: Arity::new(
                    observation.joint_positions.len() + TARGET_FEATURES,
                    observation.joint_positions.len(),
                ),
            });
        }

        let mut features = Vec::with_capacity(self.feature_count());
        features.extend_from_slice(&observation.joint_positions);
        features.extend(self.encode_target(
            observation.disk_position,
            observation.disk_rotation,
            &observation.targets,
        )?);
        Ok(features)
    }
}
