pub mod traits;
pub mod evolution;
pub mod curriculum;
pub mod simulation;
pub mod extension;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use evolution::EvolutionConfig;
pub use curriculum::CurriculumConfig;
pub use simulation::SimulationConfig;
pub use extension::ExtensionPolicy;
pub use traits::ConfigSection;
