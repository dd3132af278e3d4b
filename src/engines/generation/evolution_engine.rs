use crate::config::EvolutionConfig;
use crate::engines::evaluation::network::Network;
use crate::engines::evaluation::task::FitnessEvaluator;
use crate::engines::generation::{
    genome::Genome,
    hall_of_fame::{EliteGenome, HallOfFame},
    operators::*,
    progress::LogProgressCallback,
};
use crate::error::{CurriculumError, Result};
use crate::types::Arity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// What a finished `auto_run` hands back to the orchestrator
pub struct RunOutcome<S> {
    pub state: S,
    /// Rank-ordered, best first, never empty
    pub best_genomes: Vec<Genome>,
    pub generations: usize,
    pub best_fitness: f64,
}

/// Population search capability driven by the curriculum
pub trait EvolutionaryEngine {
    type State;
    type Evaluable;

    /// Interface arity every genome of this engine must have
    fn arity(&self) -> Arity;

    /// Fresh search state with a default-initialized population
    fn setup(&mut self) -> Result<Self::State>;

    /// Put `seeds` at the front of the population; the remainder keeps its
    /// default initialization
    fn seed(&mut self, state: Self::State, seeds: Vec<Genome>) -> Result<Self::State>;

    /// Search until the engine's own stopping condition holds
    fn auto_run(&mut self, state: Self::State) -> Result<RunOutcome<Self::State>>;

    fn transform(&self, state: &Self::State, genome: &Genome) -> Result<Self::Evaluable>;

    fn forward(
        &self,
        state: &Self::State,
        evaluable: &Self::Evaluable,
        features: &[f64],
    ) -> Result<Vec<f64>>;
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, hall_of_fame_size: usize);
    fn on_genome_evaluated(&mut self, genome_num: usize, total: usize);
}

#[derive(Debug, Clone)]
pub struct EngineState {
    pub population: Vec<Genome>,
    /// Generations consumed so far by this state
    pub generation: usize,
}

/// Generational neuroevolution over graph genomes
pub struct NeatEngine<F: FitnessEvaluator> {
    config: EvolutionConfig,
    evaluator: F,
    rng: StdRng,
    callback: Box<dyn ProgressCallback>,
}

impl<F: FitnessEvaluator> NeatEngine<F> {
    pub fn new(config: EvolutionConfig, evaluator: F) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            evaluator,
            rng,
            callback: Box::new(LogProgressCallback::default()),
        }
    }

    pub fn with_callback(mut self, callback: Box<dyn ProgressCallback>) -> Self {
        self.callback = callback;
        self
    }

    fn initialize_population(&mut self) -> Vec<Genome> {
        let arity = self.evaluator.arity();
        (0..self.config.population_size)
            .map(|_| Genome::minimal(arity, &mut self.rng))
            .collect()
    }

    /// Fitness of every genome, in population order
    fn evaluate_population(&mut self, population: &[Genome]) -> Result<Vec<(Genome, f64)>> {
        let evaluator = &self.evaluator;
        let fitness: Vec<f64> = population
            .par_iter()
            .map(|genome| {
                let network = Network::compile(genome)?;
                evaluator.evaluate(&network)
            })
            .collect::<Result<Vec<f64>>>()?;
        self.callback.on_genome_evaluated(population.len(), population.len());

        Ok(population
            .iter()
            .cloned()
            .zip(fitness.into_iter().map(|f| if f.is_finite() { f } else { f64::MIN }))
            .collect())
    }

    fn create_next_generation(&mut self, evaluated: &[(Genome, f64)]) -> Vec<Genome> {
        let mut next_generation = Vec::with_capacity(self.config.population_size);

        // Elitism: copy top performers
        let mut sorted: Vec<&(Genome, f64)> = evaluated.iter().collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (genome, _) in sorted.iter().take(self.config.elitism_count) {
            next_generation.push(genome.clone());
        }

        while next_generation.len() < self.config.population_size {
            let (parent, parent_fitness) =
                tournament_selection(evaluated, self.config.tournament_size, &mut self.rng);
            let mut child = if self.rng.gen::<f64>() < self.config.crossover_rate {
                let (mate, mate_fitness) =
                    tournament_selection(evaluated, self.config.tournament_size, &mut self.rng);
                if mate_fitness > parent_fitness {
                    crossover(mate, parent, &mut self.rng)
                } else {
                    crossover(parent, mate, &mut self.rng)
                }
            } else {
                parent.clone()
            };

            mutate_weights(
                &mut child,
                self.config.weight_mutation_rate,
                self.config.weight_mutation_power,
                &mut self.rng,
            );
            if self.rng.gen::<f64>() < self.config.add_connection_rate {
                mutate_add_connection(&mut child, &mut self.rng);
            }
            if self.rng.gen::<f64>() < self.config.add_node_rate {
                mutate_add_node(&mut child, &mut self.rng);
            }
            next_generation.push(child);
        }

        next_generation
    }

    fn check_arity(&self, genome: &Genome) -> Result<()> {
        if genome.arity() != self.arity() {
            return Err(CurriculumError::StructuralMismatch {
                expected: self.arity(),
                found: genome.arity(),
            });
        }
        Ok(())
    }
}

impl<F: FitnessEvaluator> EvolutionaryEngine for NeatEngine<F> {
    type State = EngineState;
    type Evaluable = Network;

    fn arity(&self) -> Arity {
        self.evaluator.arity()
    }

    fn setup(&mut self) -> Result<EngineState> {
        Ok(EngineState {
            population: self.initialize_population(),
            generation: 0,
        })
    }

    fn seed(&mut self, mut state: EngineState, seeds: Vec<Genome>) -> Result<EngineState> {
        for genome in &seeds {
            self.check_arity(genome)?;
            genome.validate()?;
        }
        if seeds.len() > state.population.len() {
            log::warn!(
                "{} seed genomes exceed population size {}; extra seeds dropped",
                seeds.len(),
                state.population.len()
            );
        }

        let count = seeds.len().min(state.population.len());
        for (slot, genome) in state.population.iter_mut().zip(seeds) {
            *slot = genome;
        }
        log::debug!(
            "Seeded {} of {} genomes; {} keep default initialization",
            count,
            state.population.len(),
            state.population.len() - count
        );
        Ok(state)
    }

    fn auto_run(&mut self, mut state: EngineState) -> Result<RunOutcome<EngineState>> {
        if state.population.is_empty() {
            return Err(CurriculumError::Engine("cannot search an empty population".to_string()));
        }
        for genome in &state.population {
            self.check_arity(genome)?;
        }

        let mut hall_of_fame = HallOfFame::new(self.config.elite_count);
        let mut generations = 0;
        let mut best_fitness = f64::MIN;

        for generation in 0..self.config.max_generations {
            self.callback.on_generation_start(generation);

            let evaluated = self.evaluate_population(&state.population)?;
            for (genome, fitness) in &evaluated {
                hall_of_fame.try_add(EliteGenome::new(genome.clone(), *fitness));
            }
            generations = generation + 1;
            state.generation += 1;

            best_fitness = hall_of_fame.best().map_or(f64::MIN, |e| e.fitness);
            self.callback
                .on_generation_complete(generation, best_fitness, hall_of_fame.len());

            if best_fitness >= self.config.fitness_target {
                log::info!(
                    "Fitness target {:.4} reached after {} generations",
                    self.config.fitness_target,
                    generations
                );
                break;
            }
            if generation + 1 == self.config.max_generations {
                log::info!(
                    "Generation budget of {} exhausted; best fitness {:.4}",
                    self.config.max_generations,
                    best_fitness
                );
                break;
            }

            state.population = self.create_next_generation(&evaluated);
        }

        let best_genomes = hall_of_fame.into_genomes();
        if best_genomes.is_empty() {
            return Err(CurriculumError::Engine("search produced no genomes".to_string()));
        }

        Ok(RunOutcome {
            state,
            best_genomes,
            generations,
            best_fitness,
        })
    }

    fn transform(&self, _state: &EngineState, genome: &Genome) -> Result<Network> {
        self.check_arity(genome)?;
        Network::compile(genome)
    }

    fn forward(&self, _state: &EngineState, network: &Network, features: &[f64]) -> Result<Vec<f64>> {
        network.forward(features)
    }
}
