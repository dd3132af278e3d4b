pub mod sensory;
pub mod network;
pub mod environment;
pub mod task;

pub use sensory::{closest_target, direction_to_target, SensoryEncoder};
pub use network::Network;
pub use environment::{PlanarDiskEnv, SimulationEnvironment};
pub use task::{FitnessEvaluator, LocomotionTask, RolloutSummary};
