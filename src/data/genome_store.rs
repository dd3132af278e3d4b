use crate::engines::generation::genome::Genome;
use crate::error::{CurriculumError, Result};
use crate::types::CurriculumMode;
use std::fmt;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Metadata encoded in an elite genome's file name, e.g. `best_0_genome_3_seg_nr2.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeFileName {
    pub rank: usize,
    pub segment_count: usize,
    pub run_index: Option<usize>,
    pub mode: CurriculumMode,
}

impl GenomeFileName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(&format!(".{}", EXTENSION))?;
        let mut parts = stem.strip_prefix("best_")?.split('_');

        let rank = parts.next()?.parse().ok()?;
        if parts.next()? != "genome" {
            return None;
        }
        let segment_count = parts.next()?.parse().ok()?;
        if parts.next()? != "seg" {
            return None;
        }

        let mut run_index = None;
        let mut mode = CurriculumMode::Curriculum;
        for part in parts {
            if part == "direct" {
                mode = CurriculumMode::Direct;
            } else {
                run_index = Some(part.strip_prefix("nr")?.parse().ok()?);
            }
        }

        Some(Self {
            rank,
            segment_count,
            run_index,
            mode,
        })
    }
}

impl fmt::Display for GenomeFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "best_{}_genome_{}_seg", self.rank, self.segment_count)?;
        if let Some(index) = self.run_index {
            write!(f, "_nr{}", index)?;
        }
        if self.mode == CurriculumMode::Direct {
            write!(f, "_direct")?;
        }
        write!(f, ".{}", EXTENSION)
    }
}

/// One JSON genome per file under a model directory
#[derive(Debug, Clone)]
pub struct GenomeStore {
    dir: PathBuf,
}

impl GenomeStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, genome: &Genome, name: &GenomeFileName) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name.to_string());
        std::fs::write(&path, serde_json::to_string_pretty(genome)?)?;
        log::info!("Best genome saved to {}", path.display());
        Ok(path)
    }

    /// Save a stage's elites, rank 0 first
    pub fn save_stage(
        &self,
        best_genomes: &[Genome],
        segment_count: usize,
        run_index: Option<usize>,
        mode: CurriculumMode,
    ) -> Result<Vec<PathBuf>> {
        best_genomes
            .iter()
            .enumerate()
            .map(|(rank, genome)| {
                self.save(
                    genome,
                    &GenomeFileName {
                        rank,
                        segment_count,
                        run_index,
                        mode,
                    },
                )
            })
            .collect()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Genome> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CurriculumError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read genome {}: {}", path.display(), e),
            ))
        })?;
        let genome: Genome = serde_json::from_str(&contents)?;
        genome.validate()?;
        Ok(genome)
    }
}
