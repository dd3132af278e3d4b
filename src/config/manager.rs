use super::{
    curriculum::CurriculumConfig, evolution::EvolutionConfig, extension::ExtensionPolicy,
    simulation::SimulationConfig, traits::ConfigSection,
};
use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables overriding file values,
/// e.g. `LIMB__EVOLUTION__POPULATION_SIZE=128`
pub const ENV_PREFIX: &str = "LIMB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub curriculum: CurriculumConfig,
    pub simulation: SimulationConfig,
    pub extension: ExtensionPolicy,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), CurriculumError> {
        self.evolution.validate()?;
        self.curriculum.validate()?;
        self.simulation.validate()?;
        self.extension.validate()?;
        Ok(())
    }
}

pub struct ConfigManager;

impl ConfigManager {
    /// Layer a config file and `LIMB__*` environment overrides on top of the defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig, CurriculumError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CurriculumError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<(), CurriculumError> {
        let toml_str = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Loading reads the process environment; tests that load must not overlap
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_segment_range() {
        let mut config = AppConfig::default();
        config.curriculum.start_segments = 4;
        config.curriculum.max_segments = 2;
        assert!(matches!(
            config.validate(),
            Err(CurriculumError::Configuration(_))
        ));
    }

    #[test]
    fn test_save_and_load_partial_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");

        let mut config = AppConfig::default();
        config.evolution.population_size = 12;
        config.curriculum.max_segments = 3;
        ConfigManager::save_to_file(&config, &path).unwrap();

        let loaded = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.evolution.population_size, 12);
        assert_eq!(loaded.curriculum.max_segments, 3);
        assert_eq!(loaded.curriculum.arm_count, 5);
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigManager::load_from_file("/nonexistent/limb.toml");
        assert!(matches!(result, Err(CurriculumError::Configuration(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        ConfigManager::save_to_file(&AppConfig::default(), &path).unwrap();

        std::env::set_var("LIMB__EVOLUTION__POPULATION_SIZE", "128");
        let loaded = ConfigManager::load_from_file(&path);
        std::env::remove_var("LIMB__EVOLUTION__POPULATION_SIZE");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.evolution.population_size, 128);
        assert_eq!(loaded.evolution.max_generations, 200);
    }
}
