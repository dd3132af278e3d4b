use crate::error::{CurriculumError, Result};
use crate::types::Arity;
use serde::{Deserialize, Serialize};

/// Actuated joints per segment: in-plane and out-of-plane
pub const JOINTS_PER_SEGMENT: usize = 2;

/// Target-relative features appended after the joint positions
pub const TARGET_FEATURES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointAxis {
    InPlane,
    OutOfPlane,
}

impl JointAxis {
    pub const ALL: [JointAxis; JOINTS_PER_SEGMENT] = [JointAxis::InPlane, JointAxis::OutOfPlane];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointChannel {
    pub arm: usize,
    pub segment: usize,
    pub axis: JointAxis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputChannel {
    JointPosition(JointChannel),
    TargetDirection,
}

/// Meaning of every input and output slot for one morphology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceLayout {
    segment_count: usize,
    arm_count: usize,
    inputs: Vec<InputChannel>,
    outputs: Vec<JointChannel>,
}

impl InterfaceLayout {
    pub fn new(segment_count: usize, arm_count: usize) -> Self {
        let mut outputs = Vec::with_capacity(Self::joint_count(segment_count, arm_count));
        for arm in 0..arm_count {
            for segment in 0..segment_count {
                for axis in JointAxis::ALL {
                    outputs.push(JointChannel { arm, segment, axis });
                }
            }
        }

        let mut inputs: Vec<InputChannel> =
            outputs.iter().copied().map(InputChannel::JointPosition).collect();
        inputs.push(InputChannel::TargetDirection);

        Self {
            segment_count,
            arm_count,
            inputs,
            outputs,
        }
    }

    pub fn joint_count(segment_count: usize, arm_count: usize) -> usize {
        segment_count * arm_count * JOINTS_PER_SEGMENT
    }

    pub fn arity_for(segment_count: usize, arm_count: usize) -> Arity {
        let joints = Self::joint_count(segment_count, arm_count);
        Arity::new(joints + TARGET_FEATURES, joints)
    }

    /// Recover the segment count whose layout produces `arity`
    pub fn infer_segment_count(arity: Arity, arm_count: usize) -> Result<usize> {
        let per_segment = arm_count * JOINTS_PER_SEGMENT;
        if per_segment == 0 || arity.outputs == 0 || arity.outputs % per_segment != 0 {
            return Err(CurriculumError::StructuralMismatch {
                expected: Self::arity_for(1, arm_count),
                found: arity,
            });
        }
        let segment_count = arity.outputs / per_segment;
        let expected = Self::arity_for(segment_count, arm_count);
        if expected != arity {
            return Err(CurriculumError::StructuralMismatch {
                expected,
                found: arity,
            });
        }
        Ok(segment_count)
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    pub fn arity(&self) -> Arity {
        Arity::new(self.inputs.len(), self.outputs.len())
    }

    pub fn inputs(&self) -> &[InputChannel] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[JointChannel] {
        &self.outputs
    }

    pub fn input_slot(&self, channel: &InputChannel) -> Option<usize> {
        self.inputs.iter().position(|c| c == channel)
    }

    pub fn output_slot(&self, channel: &JointChannel) -> Option<usize> {
        self.outputs.iter().position(|c| c == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_grows_with_segments() {
        assert_eq!(InterfaceLayout::arity_for(1, 2), Arity::new(5, 4));
        assert_eq!(InterfaceLayout::arity_for(2, 2), Arity::new(9, 8));
        assert_eq!(InterfaceLayout::arity_for(5, 5), Arity::new(51, 50));
        assert_eq!(InterfaceLayout::new(3, 5).arity(), InterfaceLayout::arity_for(3, 5));
    }

    #[test]
    fn test_channel_order_is_arm_major() {
        let layout = InterfaceLayout::new(2, 2);
        assert_eq!(
            layout.outputs()[2],
            JointChannel { arm: 0, segment: 1, axis: JointAxis::InPlane }
        );
        assert_eq!(
            layout.outputs()[4],
            JointChannel { arm: 1, segment: 0, axis: JointAxis::InPlane }
        );
        assert_eq!(layout.inputs().last(), Some(&InputChannel::TargetDirection));
    }

    #[test]
    fn test_infer_segment_count() {
        let arity = InterfaceLayout::arity_for(3, 5);
        assert_eq!(InterfaceLayout::infer_segment_count(arity, 5).unwrap(), 3);
        assert!(InterfaceLayout::infer_segment_count(Arity::new(7, 4), 2).is_err());
        assert!(InterfaceLayout::infer_segment_count(Arity::new(5, 3), 2).is_err());
    }
}
