use crate::engines::generation::genome::Genome;
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct EliteGenome {
    pub genome: Genome,
    pub fitness: f64,
    pub signature: String, // For deduplication
}

impl EliteGenome {
    pub fn new(genome: Genome, fitness: f64) -> Self {
        let signature = genome.signature();
        Self {
            genome,
            fitness,
            signature,
        }
    }
}

/// Best-K distinct genomes seen during a run, best first
pub struct HallOfFame {
    genomes: Vec<EliteGenome>,
    max_size: usize,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            genomes: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add a genome to the Hall of Fame
    pub fn try_add(&mut self, elite: EliteGenome) -> bool {
        if self.seen_signatures.contains(&elite.signature) {
            return false;
        }
        if self.genomes.len() >= self.max_size
            && self
                .genomes
                .last()
                .map_or(false, |worst| elite.fitness <= worst.fitness)
        {
            return false;
        }

        self.seen_signatures.insert(elite.signature.clone());
        self.genomes.push(elite);

        // Stable sort keeps the earlier entry ahead on equal fitness
        self.genomes.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.genomes.len() > self.max_size {
            if let Some(removed) = self.genomes.pop() {
                self.seen_signatures.remove(&removed.signature);
            }
        }

        true
    }

    pub fn get_all(&self) -> &[EliteGenome] {
        &self.genomes
    }

    pub fn best(&self) -> Option<&EliteGenome> {
        self.genomes.first()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes.into_iter().map(|e| e.genome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Arity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_genome(seed: u64) -> Genome {
        Genome::minimal(Arity::new(2, 1), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_keeps_best_k_in_order() {
        let mut hof = HallOfFame::new(2);
        hof.try_add(EliteGenome::new(random_genome(1), 0.5));
        hof.try_add(EliteGenome::new(random_genome(2), 2.0));
        hof.try_add(EliteGenome::new(random_genome(3), 1.0));

        let fitness: Vec<f64> = hof.get_all().iter().map(|e| e.fitness).collect();
        assert_eq!(fitness, vec![2.0, 1.0]);
    }

    #[test]
    fn test_rejects_duplicate_structure() {
        let mut hof = HallOfFame::new(4);
        assert!(hof.try_add(EliteGenome::new(random_genome(1), 1.0)));
        assert!(!hof.try_add(EliteGenome::new(random_genome(1), 3.0)));
        assert_eq!(hof.len(), 1);
    }

    #[test]
    fn test_evicted_genome_can_return() {
        let mut hof = HallOfFame::new(1);
        hof.try_add(EliteGenome::new(random_genome(1), 1.0));
        hof.try_add(EliteGenome::new(random_genome(2), 2.0));
        assert!(hof.try_add(EliteGenome::new(random_genome(1), 5.0)));
        assert_eq!(hof.best().map(|e| e.fitness), Some(5.0));
    }
}
