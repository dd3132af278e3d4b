use crate::config::ExtensionPolicy;
use crate::engines::generation::evolution_engine::EvolutionaryEngine;
use crate::engines::generation::genome::{Activation, Genome, NodeId, NodeKind};
use crate::engines::generation::layout::{InputChannel, InterfaceLayout, JointChannel};
use crate::error::{CurriculumError, Result};
use crate::types::Arity;
use std::collections::HashMap;

/// Fully determines one structural transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionRequest<'a> {
    pub genomes: &'a [Genome],
    pub source_segment_count: usize,
    pub target_segment_count: usize,
    pub arm_count: usize,
}

impl<'a> ExtensionRequest<'a> {
    pub fn new(
        genomes: &'a [Genome],
        source_segment_count: usize,
        target_segment_count: usize,
        arm_count: usize,
    ) -> Self {
        Self {
            genomes,
            source_segment_count,
            target_segment_count,
            arm_count,
        }
    }
}

/// Grows genomes to the interface of a larger morphology.
///
/// Existing nodes and connections keep their identities; old interface nodes
/// move to their channel's slot in the new layout.
#[derive(Debug, Clone, Default)]
pub struct GenomeExtender {
    policy: ExtensionPolicy,
}

impl GenomeExtender {
    pub fn new(policy: ExtensionPolicy) -> Self {
        Self { policy }
    }

    /// Extend `genomes` by `extra_segments` per arm and seed a fresh state of `engine`.
    ///
    /// Every genome is extended and validated before the engine state is
    /// touched, so a failure never leaves a partially seeded population.
    pub fn extend<E: EvolutionaryEngine>(
        &self,
        state: E::State,
        engine: &mut E,
        genomes: &[Genome],
        current_segment_count: usize,
        extra_segments: usize,
        arm_count: usize,
    ) -> Result<E::State> {
        let request = ExtensionRequest::new(
            genomes,
            current_segment_count,
            current_segment_count + extra_segments,
            arm_count,
        );
        let seeds = self.extend_all(&request)?;

        let expected = InterfaceLayout::arity_for(request.target_segment_count, arm_count);
        if engine.arity() != expected {
            return Err(CurriculumError::StructuralMismatch {
                expected,
                found: engine.arity(),
            });
        }

        log::info!(
            "Extended {} genome(s) from {} to {} segments per arm",
            seeds.len(),
            request.source_segment_count,
            request.target_segment_count
        );
        engine.seed(state, seeds)
    }

    /// Apply the same transformation independently to every source genome
    pub fn extend_all(&self, request: &ExtensionRequest<'_>) -> Result<Vec<Genome>> {
        let old_layout = InterfaceLayout::new(request.source_segment_count, request.arm_count);
        let new_layout = InterfaceLayout::new(request.target_segment_count, request.arm_count);

        request
            .genomes
            .iter()
            .map(|genome| self.extend_genome(genome, &old_layout, &new_layout))
            .collect()
    }

    /// Graft the interface of `new_layout` onto a genome built for `old_layout`
    pub fn extend_genome(
        &self,
        genome: &Genome,
        old_layout: &InterfaceLayout,
        new_layout: &InterfaceLayout,
    ) -> Result<Genome> {
        let (old_arity, new_arity) = (old_layout.arity(), new_layout.arity());
        if !new_arity.covers(&old_arity) {
            return Err(CurriculumError::ArityShrink {
                from: old_arity,
                to: new_arity,
            });
        }
        if genome.arity() != old_arity {
            return Err(CurriculumError::StructuralMismatch {
                expected: old_arity,
                found: genome.arity(),
            });
        }
        genome.validate()?;

        let mut extended = genome.clone();

        let mut inputs = Vec::with_capacity(new_arity.inputs);
        let mut fresh_inputs: Vec<(InputChannel, NodeId)> = Vec::new();
        for channel in new_layout.inputs() {
            match old_layout.input_slot(channel) {
                Some(slot) => inputs.push(genome.input_nodes()[slot]),
                None => {
                    let id = extended.push_node(NodeKind::Input, 0.0, Activation::Identity);
                    fresh_inputs.push((*channel, id));
                    inputs.push(id);
                }
            }
        }

        let mut outputs = Vec::with_capacity(new_arity.outputs);
        let mut fresh_outputs: HashMap<JointChannel, NodeId> = HashMap::new();
        let mut fresh_order: Vec<NodeId> = Vec::new();
        for channel in new_layout.outputs() {
            match old_layout.output_slot(channel) {
                Some(slot) => outputs.push(genome.output_nodes()[slot]),
                None => {
                    let activation = sibling_activation(genome, old_layout, channel);
                    let id = extended.push_node(NodeKind::Output, 0.0, activation);
                    fresh_outputs.insert(*channel, id);
                    fresh_order.push(id);
                    outputs.push(id);
                }
            }
        }

        // Every old interface node must have found its channel in the new layout
        let reused_inputs = inputs.len() - fresh_inputs.len();
        let reused_outputs = outputs.len() - fresh_order.len();
        if reused_inputs != old_arity.inputs || reused_outputs != old_arity.outputs {
            return Err(CurriculumError::StructuralMismatch {
                expected: old_arity,
                found: Arity::new(reused_inputs, reused_outputs),
            });
        }

        if let Some(slot) = new_layout.input_slot(&InputChannel::TargetDirection) {
            let direction = inputs[slot];
            for &output in &fresh_order {
                extended.add_connection(direction, output, self.policy.new_output_weight)?;
            }
        }

        if self.policy.connect_new_inputs {
            for (channel, input) in &fresh_inputs {
                if let InputChannel::JointPosition(joint) = channel {
                    if let Some(&output) = fresh_outputs.get(joint) {
                        extended.add_connection(*input, output, self.policy.new_input_weight)?;
                    }
                }
            }
        }

        extended.set_interface(inputs, outputs);
        extended.validate()?;
        if extended.arity() != new_arity {
            return Err(CurriculumError::StructuralMismatch {
                expected: new_arity,
                found: extended.arity(),
            });
        }

        log::debug!(
            "Grafted {} input(s) and {} output(s): arity {} -> {}",
            fresh_inputs.len(),
            fresh_order.len(),
            old_arity,
            new_arity
        );
        Ok(extended)
    }
}

/// Activation of the nearest more proximal output on the same arm and axis
fn sibling_activation(genome: &Genome, old_layout: &InterfaceLayout, channel: &JointChannel) -> Activation {
    (0..channel.segment.min(old_layout.segment_count()))
        .rev()
        .find_map(|segment| {
            let sibling = JointChannel { segment, ..*channel };
            old_layout
                .output_slot(&sibling)
                .and_then(|slot| genome.node(genome.output_nodes()[slot]))
                .map(|node| node.activation)
        })
        .unwrap_or(Activation::Tanh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::network::Network;
    use crate::engines::generation::evolution_engine::RunOutcome;
    use crate::engines::generation::layout::JointAxis;
    use crate::engines::generation::operators::{mutate_add_connection, mutate_add_node};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn evolved_genome(segments: usize, arms: usize, seed: u64) -> Genome {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut genome = Genome::minimal(InterfaceLayout::arity_for(segments, arms), &mut rng);
        for _ in 0..5 {
            mutate_add_node(&mut genome, &mut rng);
            mutate_add_connection(&mut genome, &mut rng);
        }
        genome
    }

    #[test]
    fn test_zero_extra_segments_is_identity() {
        let genome = evolved_genome(2, 2, 1);
        let layout = InterfaceLayout::new(2, 2);
        let extended = GenomeExtender::default()
            .extend_genome(&genome, &layout, &layout)
            .unwrap();
        assert_eq!(extended, genome);
    }

    #[test]
    fn test_grows_to_new_arity() {
        let genome = evolved_genome(1, 2, 2);
        let request = ExtensionRequest::new(std::slice::from_ref(&genome), 1, 2, 2);
        let extended = GenomeExtender::default().extend_all(&request).unwrap();

        assert_eq!(extended.len(), 1);
        assert_eq!(extended[0].arity(), InterfaceLayout::arity_for(2, 2));
        assert!(extended[0].validate().is_ok());
    }

    #[test]
    fn test_existing_structure_is_untouched() {
        let genome = evolved_genome(1, 3, 3);
        let extended = GenomeExtender::default()
            .extend_genome(&genome, &InterfaceLayout::new(1, 3), &InterfaceLayout::new(3, 3))
            .unwrap();

        assert_eq!(&extended.nodes()[..genome.nodes().len()], genome.nodes());
        assert_eq!(
            &extended.connections()[..genome.connections().len()],
            genome.connections()
        );

        let old_inputs: HashSet<_> = genome.input_nodes().iter().collect();
        assert!(old_inputs.iter().all(|id| extended.input_nodes().contains(id)));
    }

    #[test]
    fn test_old_channels_keep_their_node() {
        let genome = evolved_genome(1, 2, 4);
        let (old, new) = (InterfaceLayout::new(1, 2), InterfaceLayout::new(2, 2));
        let extended = GenomeExtender::default().extend_genome(&genome, &old, &new).unwrap();

        let channel = JointChannel { arm: 1, segment: 0, axis: JointAxis::OutOfPlane };
        let old_slot = old.output_slot(&channel).unwrap();
        let new_slot = new.output_slot(&channel).unwrap();
        assert_eq!(extended.output_nodes()[new_slot], genome.output_nodes()[old_slot]);

        let direction = InputChannel::TargetDirection;
        assert_eq!(
            extended.input_nodes()[new.input_slot(&direction).unwrap()],
            genome.input_nodes()[old.input_slot(&direction).unwrap()]
        );
    }

    #[test]
    fn test_inherited_behavior_is_preserved() {
        let genome = evolved_genome(1, 2, 5);
        let (old, new) = (InterfaceLayout::new(1, 2), InterfaceLayout::new(2, 2));
        let extended = GenomeExtender::default().extend_genome(&genome, &old, &new).unwrap();

        let old_features = [0.3, -0.2, 0.1, 0.4, 1.2];
        let mut new_features = vec![0.0; new.arity().inputs];
        for (slot, channel) in old.inputs().iter().enumerate() {
            new_features[new.input_slot(channel).unwrap()] = old_features[slot];
        }

        let old_actions = Network::compile(&genome).unwrap().forward(&old_features).unwrap();
        let new_actions = Network::compile(&extended).unwrap().forward(&new_features).unwrap();

        for (slot, channel) in old.outputs().iter().enumerate() {
            assert_eq!(old_actions[slot], new_actions[new.output_slot(channel).unwrap()]);
        }
    }

    #[test]
    fn test_new_outputs_get_low_impact_wiring() {
        let genome = evolved_genome(1, 1, 6);
        let (old, new) = (InterfaceLayout::new(1, 1), InterfaceLayout::new(2, 1));
        let extended = GenomeExtender::default().extend_genome(&genome, &old, &new).unwrap();
        let added = &extended.connections()[genome.connections().len()..];

        // two new outputs from the direction input, two new input -> output links
        assert_eq!(added.len(), 4);
        let direction = extended.input_nodes()[new.input_slot(&InputChannel::TargetDirection).unwrap()];
        assert_eq!(added.iter().filter(|c| c.source == direction && c.weight == 0.05).count(), 2);
        assert!(added.iter().all(|c| c.weight.abs() <= 0.05));
    }

    #[test]
    fn test_new_inputs_can_stay_unwired() {
        let policy = ExtensionPolicy {
            connect_new_inputs: false,
            ..ExtensionPolicy::default()
        };
        let genome = evolved_genome(1, 1, 7);
        let extended = GenomeExtender::new(policy)
            .extend_genome(&genome, &InterfaceLayout::new(1, 1), &InterfaceLayout::new(2, 1))
            .unwrap();
        assert_eq!(extended.connections().len(), genome.connections().len() + 2);
    }

    #[test]
    fn test_rejects_shrinking_arity() {
        let genome = evolved_genome(2, 2, 8);
        let err = GenomeExtender::default()
            .extend_genome(&genome, &InterfaceLayout::new(2, 2), &InterfaceLayout::new(1, 2))
            .unwrap_err();
        assert!(matches!(err, CurriculumError::ArityShrink { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_rejects_source_with_wrong_arity() {
        let genome = evolved_genome(2, 2, 9);
        let request = ExtensionRequest::new(std::slice::from_ref(&genome), 1, 2, 2);
        let err = GenomeExtender::default().extend_all(&request).unwrap_err();
        assert!(matches!(
            err,
            CurriculumError::StructuralMismatch { expected, found }
                if expected == Arity::new(5, 4) && found == Arity::new(9, 8)
        ));
    }

    #[test]
    fn test_rejects_changed_arm_count() {
        let genome = evolved_genome(1, 3, 10);
        let err = GenomeExtender::default()
            .extend_genome(&genome, &InterfaceLayout::new(1, 3), &InterfaceLayout::new(2, 2))
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_batch_extends_each_genome_independently() {
        let genomes = vec![evolved_genome(1, 2, 11), evolved_genome(1, 2, 12)];
        let request = ExtensionRequest::new(&genomes, 1, 3, 2);
        let extended = GenomeExtender::default().extend_all(&request).unwrap();

        assert_eq!(extended.len(), 2);
        for (source, seed) in genomes.iter().zip(&extended) {
            assert_eq!(seed.arity(), InterfaceLayout::arity_for(3, 2));
            assert_eq!(&seed.nodes()[..source.nodes().len()], source.nodes());
        }
    }

    /// Counts `seed` calls; population is a plain vector
    struct SpyEngine {
        arity: Arity,
        seeded: usize,
    }

    impl EvolutionaryEngine for SpyEngine {
        type State = Vec<Genome>;
        type Evaluable = ();

        fn arity(&self) -> Arity {
            self.arity
        }

        fn setup(&mut self) -> Result<Vec<Genome>> {
            Ok(vec![Genome::empty(self.arity); 4])
        }

        fn seed(&mut self, mut state: Vec<Genome>, seeds: Vec<Genome>) -> Result<Vec<Genome>> {
            self.seeded += 1;
            for (slot, genome) in state.iter_mut().zip(seeds) {
                *slot = genome;
            }
            Ok(state)
        }

        fn auto_run(&mut self, state: Vec<Genome>) -> Result<RunOutcome<Vec<Genome>>> {
            Ok(RunOutcome {
                best_genomes: state.clone(),
                state,
                generations: 0,
                best_fitness: 0.0,
            })
        }

        fn transform(&self, _state: &Vec<Genome>, _genome: &Genome) -> Result<()> {
            Ok(())
        }

        fn forward(&self, _state: &Vec<Genome>, _evaluable: &(), features: &[f64]) -> Result<Vec<f64>> {
            Ok(features.to_vec())
        }
    }

    #[test]
    fn test_mixed_batch_fails_before_seeding() {
        let mut engine = SpyEngine {
            arity: InterfaceLayout::arity_for(2, 2),
            seeded: 0,
        };
        let state = engine.setup().unwrap();
        let genomes = vec![evolved_genome(1, 2, 13), evolved_genome(2, 2, 14)];

        let err = GenomeExtender::default()
            .extend(state, &mut engine, &genomes, 1, 1, 2)
            .unwrap_err();

        assert!(err.is_structural());
        assert_eq!(engine.seeded, 0);
    }

    #[test]
    fn test_extend_seeds_engine_once() {
        let mut engine = SpyEngine {
            arity: InterfaceLayout::arity_for(2, 2),
            seeded: 0,
        };
        let state = engine.setup().unwrap();
        let genomes = vec![evolved_genome(1, 2, 15)];

        let state = GenomeExtender::default()
            .extend(state, &mut engine, &genomes, 1, 1, 2)
            .unwrap();

        assert_eq!(engine.seeded, 1);
        assert_eq!(state[0].arity(), InterfaceLayout::arity_for(2, 2));
        assert_eq!(state[1], Genome::empty(InterfaceLayout::arity_for(2, 2)));
    }
}
