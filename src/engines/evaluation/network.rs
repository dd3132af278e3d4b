use crate::engines::generation::genome::{Activation, Genome, NodeKind};
use crate::error::{CurriculumError, Result};
use crate::types::Arity;

struct CompiledNode {
    index: usize,
    bias: f64,
    activation: Activation,
    /// (source index, weight) over enabled incoming connections
    incoming: Vec<(usize, f64)>,
}

/// Feed-forward evaluable form of a genome
///
/// Built once per genome and reused for every control step of a rollout.
pub struct Network {
    node_count: usize,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    order: Vec<CompiledNode>,
}

impl Network {
    /// Compile a genome; recurrent topologies are rejected
    pub fn compile(genome: &Genome) -> Result<Self> {
        let node_count = genome.nodes().len();
        let mut in_degree = vec![0usize; node_count];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];

        for connection in genome.connections().iter().filter(|c| c.enabled) {
            let (source, target) = (connection.source.0, connection.target.0);
            if source >= node_count || target >= node_count {
                return Err(CurriculumError::InvalidGenome(format!(
                    "connection {} -> {} references a missing node",
                    connection.source, connection.target
                )));
            }
            in_degree[target] += 1;
            outgoing[source].push(target);
            incoming[target].push((source, connection.weight));
        }

        // Kahn's algorithm, deterministic for a given genome
        let mut ready: Vec<usize> = (0..node_count).filter(|&i| in_degree[i] == 0).collect();
        ready.reverse();
        let mut order = Vec::with_capacity(node_count);
        while let Some(index) = ready.pop() {
            order.push(index);
            for &next in &outgoing[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(next);
                }
            }
        }
        if order.len() != node_count {
            return Err(CurriculumError::InvalidGenome(
                "genome contains a cycle among enabled connections".to_string(),
            ));
        }

        let nodes = genome.nodes();
        let order = order
            .into_iter()
            .filter(|&i| nodes[i].kind != NodeKind::Input)
            .map(|i| CompiledNode {
                index: i,
                bias: nodes[i].bias,
                activation: nodes[i].activation,
                incoming: std::mem::take(&mut incoming[i]),
            })
            .collect();

        Ok(Self {
            node_count,
            inputs: genome.input_nodes().iter().map(|id| id.0).collect(),
            outputs: genome.output_nodes().iter().map(|id| id.0).collect(),
            order,
        })
    }

    pub fn arity(&self) -> Arity {
        Arity::new(self.inputs.len(), self.outputs.len())
    }

    /// Evaluate one feature vector into one action vector
    pub fn forward(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.inputs.len() {
            return Err(CurriculumError::StructuralMismatch {
                expected: self.arity(),
                found: Arity::new(features.len(), self.outputs.len()),
            });
        }

        let mut values = vec![0.0; self.node_count];
        for (&slot, &feature) in self.inputs.iter().zip(features) {
            values[slot] = feature;
        }
        for node in &self.order {
            let sum: f64 = node
                .incoming
                .iter()
                .map(|&(source, weight)| values[source] * weight)
                .sum();
            values[node.index] = node.activation.apply(sum + node.bias);
        }

        Ok(self.outputs.iter().map(|&i| values[i]).collect())
    }
}
