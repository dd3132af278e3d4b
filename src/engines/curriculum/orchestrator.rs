use crate::config::AppConfig;
use crate::data::GenomeStore;
use crate::engines::curriculum::stage::{stage_plan, StageBuilder, StageConfig, StageSeeds};
use crate::engines::generation::evolution_engine::EvolutionaryEngine;
use crate::engines::generation::extension::GenomeExtender;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::layout::InterfaceLayout;
use crate::error::{CurriculumError, Result};
use crate::types::{Arity, CurriculumMode};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Outcome of one finished stage
#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub stage_index: usize,
    pub segment_count: usize,
    pub arity: Arity,
    /// Rank-ordered elites, best first
    pub best_genomes: Vec<Genome>,
    pub generations: usize,
    /// For locomotion stages: initial minus closest distance to the target
    pub best_fitness: f64,
    pub saved_files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CurriculumReport {
    pub mode: CurriculumMode,
    pub run_index: Option<usize>,
    pub results: Vec<TrainingResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CurriculumReport {
    pub fn total_generations(&self) -> usize {
        self.results.iter().map(|r| r.generations).sum()
    }

    pub fn log_summary(&self) {
        for result in &self.results {
            log::info!(
                "Training for {} segments took {} generations to reach the target (best distance improvement {:.4})",
                result.segment_count,
                result.generations,
                result.best_fitness
            );
        }
        log::info!(
            "Evolution completed successfully, total generations: {} ({}s)",
            self.total_generations(),
            (self.finished_at - self.started_at).num_seconds()
        );
    }
}

/// Drives the stage loop: build, search, persist, extend, repeat
pub struct CurriculumOrchestrator<B: StageBuilder> {
    config: AppConfig,
    builder: B,
    extender: GenomeExtender,
    store: Option<GenomeStore>,
    mode: CurriculumMode,
    run_index: Option<usize>,
}

impl<B: StageBuilder> CurriculumOrchestrator<B> {
    pub fn new(config: AppConfig, builder: B) -> Result<Self> {
        config.validate()?;
        let store = config.curriculum.output_dir.clone().map(GenomeStore::new);
        let extender = GenomeExtender::new(config.extension);

        Ok(Self {
            config,
            builder,
            extender,
            store,
            mode: CurriculumMode::Curriculum,
            run_index: None,
        })
    }

    pub fn with_mode(mut self, mode: CurriculumMode) -> Self {
        self.mode = mode;
        self
    }

    /// Used only to disambiguate output file names between repeated runs
    pub fn with_run_index(mut self, run_index: Option<usize>) -> Self {
        self.run_index = run_index;
        self
    }

    /// Run every stage up to the configured maximum.
    ///
    /// With an `ancestor`, the run warm-starts: the ancestor's native segment
    /// count is recovered from its arity and the first stage is one segment
    /// larger, seeded from the extended ancestor.
    pub fn run(&self, ancestor: Option<Genome>) -> Result<CurriculumReport> {
        let curriculum = &self.config.curriculum;
        let (start, seeds) = match ancestor {
            Some(ancestor) => {
                if self.mode == CurriculumMode::Direct {
                    return Err(CurriculumError::Configuration(
                        "a warm-start ancestor requires curriculum mode".to_string(),
                    ));
                }
                ancestor.validate()?;
                let native = InterfaceLayout::infer_segment_count(ancestor.arity(), curriculum.arm_count)?;
                log::info!("Warm start from an ancestor with {} segments per arm", native);
                (
                    native + 1,
                    Some(StageSeeds {
                        genomes: vec![ancestor],
                        segment_count: native,
                    }),
                )
            }
            None => (curriculum.start_segments, None),
        };
        if start > curriculum.max_segments {
            return Err(CurriculumError::Configuration(format!(
                "first stage would have {} segments, beyond the maximum of {}",
                start, curriculum.max_segments
            )));
        }

        let started_at = Utc::now();
        let plan = stage_plan(&self.config, start..=curriculum.max_segments);

        let (results, _) = plan.iter().try_fold(
            (Vec::with_capacity(plan.len()), seeds),
            |(mut results, seeds), stage| {
                let result = self.run_stage(stage, seeds.as_ref()).map_err(|e| {
                    log::error!(
                        "Stage {} with {} segments per arm failed: {}",
                        stage.stage_index,
                        stage.segment_count,
                        e
                    );
                    CurriculumError::StageFailed {
                        stage: stage.stage_index,
                        segment_count: stage.segment_count,
                        source: Box::new(e),
                    }
                })?;

                let next = match self.mode {
                    CurriculumMode::Curriculum => Some(StageSeeds {
                        genomes: result.best_genomes.clone(),
                        segment_count: stage.segment_count,
                    }),
                    CurriculumMode::Direct => None,
                };
                results.push(result);
                Ok::<_, CurriculumError>((results, next))
            },
        )?;

        let report = CurriculumReport {
            mode: self.mode,
            run_index: self.run_index,
            results,
            started_at,
            finished_at: Utc::now(),
        };
        report.log_summary();
        Ok(report)
    }

    fn run_stage(&self, stage: &StageConfig, seeds: Option<&StageSeeds>) -> Result<TrainingResult> {
        log::info!(
            "Starting stage {} for brittle star locomotion with {} segments per arm ({:?})",
            stage.stage_index,
            stage.segment_count,
            self.mode
        );

        let mut engine = self.builder.build(stage)?;
        let arity = stage.arity();
        if engine.arity() != arity {
            return Err(CurriculumError::StructuralMismatch {
                expected: arity,
                found: engine.arity(),
            });
        }
        log::info!(
            "Environment requires {} inputs and {} outputs",
            arity.inputs,
            arity.outputs
        );

        let mut state = engine.setup()?;
        if let Some(seeds) = seeds {
            let extra_segments = stage
                .segment_count
                .checked_sub(seeds.segment_count)
                .ok_or_else(|| CurriculumError::ArityShrink {
                    from: InterfaceLayout::arity_for(seeds.segment_count, stage.arm_count),
                    to: arity,
                })?;
            state = self.extender.extend(
                state,
                &mut engine,
                &seeds.genomes,
                seeds.segment_count,
                extra_segments,
                stage.arm_count,
            )?;
        }

        let outcome = engine.auto_run(state)?;
        if outcome.best_genomes.is_empty() {
            return Err(CurriculumError::Engine(
                "engine returned no best genomes".to_string(),
            ));
        }
        log::info!(
            "Stage {} finished after {} generations, best distance improvement {:.4}",
            stage.stage_index,
            outcome.generations,
            outcome.best_fitness
        );

        let saved_files = match &self.store {
            Some(store) => store.save_stage(
                &outcome.best_genomes,
                stage.segment_count,
                self.run_index,
                self.mode,
            )?,
            None => Vec::new(),
        };

        Ok(TrainingResult {
            stage_index: stage.stage_index,
            segment_count: stage.segment_count,
            arity,
            best_genomes: outcome.best_genomes,
            generations: outcome.generations,
            best_fitness: outcome.best_fitness,
            saved_files,
        })
    }
}
