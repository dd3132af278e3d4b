use super::evolution_engine::ProgressCallback;

/// Reports search progress through the `log` facade
pub struct LogProgressCallback {
    /// Log every n-th generation at info level; the rest go to debug
    pub every: usize,
}

impl Default for LogProgressCallback {
    fn default() -> Self {
        Self { every: 10 }
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::trace!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, hof_size: usize) {
        if self.every > 0 && (generation + 1) % self.every == 0 {
            log::info!(
                "Generation {} complete. Best fitness: {:.4}, Hall of Fame size: {}",
                generation + 1,
                best_fitness,
                hof_size
            );
        } else {
            log::debug!(
                "Generation {} complete. Best fitness: {:.4}",
                generation + 1,
                best_fitness
            );
        }
    }

    fn on_genome_evaluated(&mut self, genome_num: usize, total: usize) {
        if genome_num == total {
            log::trace!("  Evaluated {}/{} genomes", genome_num, total);
        }
    }
}

/// Discards all progress
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_generation_complete(&mut self, _generation: usize, _best_fitness: f64, _hof_size: usize) {}
    fn on_genome_evaluated(&mut self, _genome_num: usize, _total: usize) {}
}
