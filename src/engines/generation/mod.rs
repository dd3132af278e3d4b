pub mod genome;
pub mod layout;
pub mod operators;
pub mod hall_of_fame;
pub mod evolution_engine;
pub mod progress;
pub mod extension;

pub use genome::{Activation, ConnectionGene, Genome, NodeGene, NodeId, NodeKind};
pub use layout::{InputChannel, InterfaceLayout, JointAxis, JointChannel};
pub use hall_of_fame::{EliteGenome, HallOfFame};
pub use evolution_engine::{EngineState, EvolutionaryEngine, NeatEngine, ProgressCallback, RunOutcome};
pub use progress::{LogProgressCallback, SilentProgressCallback};
pub use extension::{ExtensionRequest, GenomeExtender};
