use crate::config::{AppConfig, EvolutionConfig, SimulationConfig};
use crate::engines::evaluation::task::LocomotionTask;
use crate::engines::generation::evolution_engine::{EvolutionaryEngine, NeatEngine};
use crate::engines::generation::genome::Genome;
use crate::engines::generation::layout::InterfaceLayout;
use crate::error::Result;
use crate::types::Arity;
use std::ops::RangeInclusive;

/// Immutable settings for one curriculum stage
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Position in the run, 0-based
    pub stage_index: usize,
    pub segment_count: usize,
    pub arm_count: usize,
    pub evolution: EvolutionConfig,
    pub simulation: SimulationConfig,
}

impl StageConfig {
    pub fn layout(&self) -> InterfaceLayout {
        InterfaceLayout::new(self.segment_count, self.arm_count)
    }

    pub fn arity(&self) -> Arity {
        InterfaceLayout::arity_for(self.segment_count, self.arm_count)
    }
}

/// One stage per segment count in `segments`, each with its own engine seed
pub fn stage_plan(config: &AppConfig, segments: RangeInclusive<usize>) -> Vec<StageConfig> {
    segments
        .enumerate()
        .map(|(stage_index, segment_count)| {
            let mut evolution = config.evolution.clone();
            evolution.seed = evolution
                .seed
                .map(|seed| seed.wrapping_add(segment_count as u64));
            StageConfig {
                stage_index,
                segment_count,
                arm_count: config.curriculum.arm_count,
                evolution,
                simulation: config.simulation.clone(),
            }
        })
        .collect()
}

/// Builds the search engine for a stage
pub trait StageBuilder {
    type Engine: EvolutionaryEngine;

    fn build(&self, stage: &StageConfig) -> Result<Self::Engine>;
}

/// Directed-locomotion stages on the planar disk body
#[derive(Debug, Clone, Copy, Default)]
pub struct LocomotionStageBuilder;

impl StageBuilder for LocomotionStageBuilder {
    type Engine = NeatEngine<LocomotionTask>;

    fn build(&self, stage: &StageConfig) -> Result<Self::Engine> {
        let task = LocomotionTask::new(stage.layout(), stage.simulation.clone());
        Ok(NeatEngine::new(stage.evolution.clone(), task))
    }
}

/// Elites of a finished stage, waiting to seed the next one
#[derive(Debug, Clone)]
pub struct StageSeeds {
    pub genomes: Vec<Genome>,
    pub segment_count: usize,
}
