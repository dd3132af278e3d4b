use crate::engines::generation::genome::{Activation, Genome, NodeId, NodeKind};
use rand::Rng;
use std::collections::HashMap;

/// Tournament selection: pick best of K random candidates
pub fn tournament_selection<'a, R: Rng>(
    population: &'a [(Genome, f64)],
    tournament_size: usize,
    rng: &mut R,
) -> (&'a Genome, f64) {
    let mut best_idx = rng.gen_range(0..population.len());
    let mut best_fitness = population[best_idx].1;

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        if population[idx].1 > best_fitness {
            best_idx = idx;
            best_fitness = population[idx].1;
        }
    }

    (&population[best_idx].0, best_fitness)
}

/// Crossover: the fitter parent's structure, with the weight of every connection
/// both parents share (same endpoints) drawn from either parent at random
pub fn crossover<R: Rng>(fitter: &Genome, other: &Genome, rng: &mut R) -> Genome {
    let other_weights: HashMap<(NodeId, NodeId), f64> = other
        .connections()
        .iter()
        .map(|c| ((c.source, c.target), c.weight))
        .collect();

    let mut child = fitter.clone();
    for connection in child.connections_mut() {
        if let Some(&weight) = other_weights.get(&(connection.source, connection.target)) {
            if rng.gen_bool(0.5) {
                connection.weight = weight;
            }
        }
    }
    child
}

/// Perturb each connection weight with probability `rate`
pub fn mutate_weights<R: Rng>(genome: &mut Genome, rate: f64, power: f64, rng: &mut R) {
    if power <= 0.0 {
        return;
    }
    for connection in genome.connections_mut() {
        if rng.gen::<f64>() < rate {
            connection.weight = (connection.weight + rng.gen_range(-power..=power)).clamp(-8.0, 8.0);
        }
    }
}

/// Add one connection that keeps the graph acyclic. Returns false if no attempt fit.
pub fn mutate_add_connection<R: Rng>(genome: &mut Genome, rng: &mut R) -> bool {
    let sources: Vec<NodeId> = genome
        .nodes()
        .iter()
        .filter(|n| n.kind != NodeKind::Output)
        .map(|n| n.id)
        .collect();
    let targets: Vec<NodeId> = genome
        .nodes()
        .iter()
        .filter(|n| n.kind != NodeKind::Input)
        .map(|n| n.id)
        .collect();
    if sources.is_empty() || targets.is_empty() {
        return false;
    }

    const ATTEMPTS: usize = 20;
    for _ in 0..ATTEMPTS {
        let source = sources[rng.gen_range(0..sources.len())];
        let target = targets[rng.gen_range(0..targets.len())];
        if source == target || genome.has_connection(source, target) || genome.reaches(target, source) {
            continue;
        }
        return genome
            .add_connection(source, target, rng.gen_range(-1.0..=1.0))
            .is_ok();
    }
    false
}

/// Split an enabled connection with a new hidden node.
///
/// The old connection is disabled; the incoming half gets weight 1 and the
/// outgoing half inherits the old weight.
pub fn mutate_add_node<R: Rng>(genome: &mut Genome, rng: &mut R) -> bool {
    let enabled: Vec<usize> = genome
        .connections()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.enabled)
        .map(|(i, _)| i)
        .collect();
    if enabled.is_empty() {
        return false;
    }

    let index = enabled[rng.gen_range(0..enabled.len())];
    let (source, target, weight) = {
        let connection = &mut genome.connections_mut()[index];
        connection.enabled = false;
        (connection.source, connection.target, connection.weight)
    };

    let hidden = genome.push_node(NodeKind::Hidden, 0.0, Activation::Tanh);
    genome.add_connection(source, hidden, 1.0).is_ok()
        && genome.add_connection(hidden, target, weight).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::network::Network;
    use crate::types::Arity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_structural_mutations_keep_genome_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut genome = Genome::minimal(Arity::new(3, 2), &mut rng);

        for _ in 0..30 {
            mutate_add_node(&mut genome, &mut rng);
            mutate_add_connection(&mut genome, &mut rng);
            mutate_weights(&mut genome, 0.5, 0.3, &mut rng);
        }

        assert!(genome.validate().is_ok());
        assert!(Network::compile(&genome).is_ok());
        assert_eq!(genome.arity(), Arity::new(3, 2));
    }

    #[test]
    fn test_add_node_preserves_existing_ids() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut genome = Genome::minimal(Arity::new(2, 1), &mut rng);
        let before: Vec<_> = genome.nodes().iter().map(|n| n.id).collect();

        assert!(mutate_add_node(&mut genome, &mut rng));
        let after: Vec<_> = genome.nodes().iter().map(|n| n.id).collect();

        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(genome.connections().iter().filter(|c| !c.enabled).count(), 1);
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(1);
        let weak = Genome::empty(Arity::new(1, 1));
        let strong = Genome::minimal(Arity::new(1, 1), &mut rng);
        let population = vec![(weak, 0.0), (strong.clone(), 10.0)];

        // with a tournament far larger than the population the best always wins
        let (picked, fitness) = tournament_selection(&population, 64, &mut rng);
        assert_eq!(picked, &strong);
        assert_eq!(fitness, 10.0);
    }

    #[test]
    fn test_crossover_keeps_fitter_structure() {
        let mut rng = StdRng::seed_from_u64(5);
        let fitter = Genome::minimal(Arity::new(2, 2), &mut rng);
        let mut other = Genome::minimal(Arity::new(2, 2), &mut rng);
        mutate_add_node(&mut other, &mut rng);

        let child = crossover(&fitter, &other, &mut rng);
        assert_eq!(child.nodes().len(), fitter.nodes().len());
        assert_eq!(child.connections().len(), fitter.connections().len());
        assert!(child.validate().is_ok());
    }
}
