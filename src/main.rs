use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use limbcurriculum::data::GenomeStore;
use limbcurriculum::{AppConfig, ConfigManager, CurriculumMode, CurriculumOrchestrator, LocomotionStageBuilder};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Seed every stage from the previous stage's best genomes
    Curriculum,
    /// Train every segment count from scratch
    NoCurriculum,
}

impl From<Mode> for CurriculumMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Curriculum => CurriculumMode::Curriculum,
            Mode::NoCurriculum => CurriculumMode::Direct,
        }
    }
}

/// Evolve brittle-star locomotion controllers, one arm segment at a time
#[derive(Parser, Debug)]
#[command(name = "limbcurriculum")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Training mode
    #[arg(short, long, value_enum, default_value_t = Mode::Curriculum)]
    mode: Mode,

    /// Run index, only used to tell output files of repeated runs apart
    #[arg(short, long)]
    index: Option<usize>,

    /// TOML configuration file (LIMB__* environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretrained genome to warm-start the curriculum from
    #[arg(long)]
    start_genome: Option<PathBuf>,

    /// Directory receiving the best genomes of every stage
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Largest segment count per arm to train
    #[arg(long)]
    max_segments: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.curriculum.output_dir = Some(dir.clone());
    }
    if let Some(max_segments) = cli.max_segments {
        config.curriculum.max_segments = max_segments;
    }

    let mode = CurriculumMode::from(cli.mode);
    let ancestor = match &cli.start_genome {
        Some(_) if mode == CurriculumMode::Direct => {
            bail!("--start-genome cannot be combined with --mode no-curriculum")
        }
        Some(path) => Some(
            GenomeStore::load(path)
                .with_context(|| format!("loading start genome {}", path.display()))?,
        ),
        None => None,
    };

    let orchestrator = CurriculumOrchestrator::new(config, LocomotionStageBuilder)?
        .with_mode(mode)
        .with_run_index(cli.index);
    let report = orchestrator.run(ancestor)?;

    for result in &report.results {
        println!(
            "{} segments: {} generations, best distance improvement {:.4}, {} genomes saved",
            result.segment_count,
            result.generations,
            result.best_fitness,
            result.saved_files.len()
        );
    }
    println!("Total generations: {}", report.total_generations());
    Ok(())
}
