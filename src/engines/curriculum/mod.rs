pub mod stage;
pub mod orchestrator;

pub use stage::{stage_plan, LocomotionStageBuilder, StageBuilder, StageConfig, StageSeeds};
pub use orchestrator::{CurriculumOrchestrator, CurriculumReport, TrainingResult};
