use super::traits::{invalid, ConfigSection};
use crate::error::CurriculumError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Generation budget per stage
    pub max_generations: usize,
    /// A stage stops early once the best fitness reaches this value
    pub fitness_target: f64,
    pub crossover_rate: f64,
    pub weight_mutation_rate: f64,
    pub weight_mutation_power: f64,
    pub add_connection_rate: f64,
    pub add_node_rate: f64,
    pub elitism_count: usize,
    pub tournament_size: usize,
    /// Number of best genomes kept per stage (top-K)
    pub elite_count: usize,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 64,
            max_generations: 200,
            fitness_target: 1.0,
            crossover_rate: 0.5,
            weight_mutation_rate: 0.8,
            weight_mutation_power: 0.5,
            add_connection_rate: 0.1,
            add_node_rate: 0.03,
            elitism_count: 2,
            tournament_size: 3,
            elite_count: 5,
            seed: Some(42),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), CurriculumError> {
        let name = Self::section_name();
        if self.population_size < 2 {
            return Err(invalid(name, "population_size must be at least 2"));
        }
        if self.max_generations == 0 {
            return Err(invalid(name, "max_generations must be at least 1"));
        }
        for (field, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("weight_mutation_rate", self.weight_mutation_rate),
            ("add_connection_rate", self.add_connection_rate),
            ("add_node_rate", self.add_node_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(name, &format!("{} must be between 0 and 1", field)));
            }
        }
        if self.weight_mutation_power < 0.0 {
            return Err(invalid(name, "weight_mutation_power must be non-negative"));
        }
        if self.tournament_size == 0 {
            return Err(invalid(name, "tournament_size must be at least 1"));
        }
        if self.elite_count == 0 || self.elite_count > self.population_size {
            return Err(invalid(name, "elite_count must be in 1..=population_size"));
        }
        if self.elitism_count > self.population_size {
            return Err(invalid(name, "elitism_count cannot exceed population_size"));
        }
        Ok(())
    }
}
