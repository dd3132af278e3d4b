use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar point `[x, y]`
pub type Point2 = [f64; 2];

/// Interface arity of a genome: (input count, output count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    pub inputs: usize,
    pub outputs: usize,
}

impl Arity {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self { inputs, outputs }
    }

    /// Neither side is smaller than `other`'s
    pub fn covers(&self, other: &Arity) -> bool {
        self.inputs >= other.inputs && self.outputs >= other.outputs
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.inputs, self.outputs)
    }
}

/// A locomotion target placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub position: Point2,
}

impl TargetRecord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { position: [x, y] }
    }
}

/// Raw world state read by the sensory encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Joint angles in layout order (arm, segment, axis)
    pub joint_positions: Vec<f64>,
    pub disk_position: Point2,
    pub disk_rotation: f64,
    pub targets: Vec<TargetRecord>,
    pub xy_distance_to_target: f64,
}

/// Which training mode produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurriculumMode {
    /// Seed each stage from the previous stage's elites
    Curriculum,
    /// Train every stage from scratch
    Direct,
}
