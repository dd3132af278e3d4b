use crate::error::{CurriculumError, Result};
use crate::types::Arity;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Input,
    Hidden,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    Tanh,
    Sigmoid,
    Relu,
}

impl Activation {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Relu => x.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub id: NodeId,
    pub kind: NodeKind,
    pub bias: f64,
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub enabled: bool,
}

/// Arena genome: a node's identity is its index in `nodes`, never reused.
/// `input_nodes[i]` receives feature `i`, `output_nodes[j]` drives actuator `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    input_nodes: Vec<NodeId>,
    output_nodes: Vec<NodeId>,
}

impl Genome {
    /// Interface-only genome with no connections
    pub fn empty(arity: Arity) -> Self {
        let mut genome = Self {
            nodes: Vec::with_capacity(arity.inputs + arity.outputs),
            connections: Vec::new(),
            input_nodes: Vec::with_capacity(arity.inputs),
            output_nodes: Vec::with_capacity(arity.outputs),
        };
        for _ in 0..arity.inputs {
            let id = genome.push_node(NodeKind::Input, 0.0, Activation::Identity);
            genome.input_nodes.push(id);
        }
        for _ in 0..arity.outputs {
            let id = genome.push_node(NodeKind::Output, 0.0, Activation::Tanh);
            genome.output_nodes.push(id);
        }
        genome
    }

    /// Fully connected input -> output genome with uniform weights in [-1, 1]
    pub fn minimal<R: Rng>(arity: Arity, rng: &mut R) -> Self {
        let mut genome = Self::empty(arity);
        for &output in &genome.output_nodes.clone() {
            for &input in &genome.input_nodes.clone() {
                genome.connections.push(ConnectionGene {
                    source: input,
                    target: output,
                    weight: rng.gen_range(-1.0..=1.0),
                    enabled: true,
                });
            }
        }
        genome
    }

    pub fn arity(&self) -> Arity {
        Arity::new(self.input_nodes.len(), self.output_nodes.len())
    }

    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut [ConnectionGene] {
        &mut self.connections
    }

    pub fn input_nodes(&self) -> &[NodeId] {
        &self.input_nodes
    }

    pub fn output_nodes(&self) -> &[NodeId] {
        &self.output_nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeGene> {
        self.nodes.get(id.0)
    }

    /// The next identity `push_node` will hand out
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    pub fn push_node(&mut self, kind: NodeKind, bias: f64, activation: Activation) -> NodeId {
        let id = self.next_node_id();
        self.nodes.push(NodeGene {
            id,
            kind,
            bias,
            activation,
        });
        id
    }

    pub fn has_connection(&self, source: NodeId, target: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == source && c.target == target)
    }

    /// Add a connection; duplicates and dangling endpoints are rejected
    pub fn add_connection(&mut self, source: NodeId, target: NodeId, weight: f64) -> Result<()> {
        if self.node(source).is_none() || self.node(target).is_none() {
            return Err(CurriculumError::InvalidGenome(format!(
                "connection {} -> {} references a missing node",
                source, target
            )));
        }
        if self.has_connection(source, target) {
            return Err(CurriculumError::InvalidGenome(format!(
                "connection {} -> {} already exists",
                source, target
            )));
        }
        self.connections.push(ConnectionGene {
            source,
            target,
            weight,
            enabled: true,
        });
        Ok(())
    }

    /// Whether `to` is reachable from `from` along any connection, enabled or not
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(
                self.connections
                    .iter()
                    .filter(|c| c.source == current)
                    .map(|c| c.target),
            );
        }
        false
    }

    /// Replace the interface order. Every listed id must already be a node of the right kind.
    pub(crate) fn set_interface(&mut self, input_nodes: Vec<NodeId>, output_nodes: Vec<NodeId>) {
        self.input_nodes = input_nodes;
        self.output_nodes = output_nodes;
    }

    /// Structural signature used to deduplicate elites
    pub fn signature(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::new())
    }

    /// Check the structural invariants of the genome
    pub fn validate(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0 != index {
                return Err(CurriculumError::InvalidGenome(format!(
                    "node at arena slot {} carries identity {}",
                    index, node.id
                )));
            }
        }

        self.validate_interface(&self.input_nodes, NodeKind::Input)?;
        self.validate_interface(&self.output_nodes, NodeKind::Output)?;

        let declared_inputs = self.nodes.iter().filter(|n| n.kind == NodeKind::Input).count();
        let declared_outputs = self.nodes.iter().filter(|n| n.kind == NodeKind::Output).count();
        if declared_inputs != self.input_nodes.len() || declared_outputs != self.output_nodes.len() {
            return Err(CurriculumError::InvalidGenome(
                "interface lists do not cover every input/output node".to_string(),
            ));
        }

        let mut pairs = HashSet::with_capacity(self.connections.len());
        for connection in &self.connections {
            if self.node(connection.source).is_none() || self.node(connection.target).is_none() {
                return Err(CurriculumError::InvalidGenome(format!(
                    "connection {} -> {} references a missing node",
                    connection.source, connection.target
                )));
            }
            if !pairs.insert((connection.source, connection.target)) {
                return Err(CurriculumError::InvalidGenome(format!(
                    "duplicate connection {} -> {}",
                    connection.source, connection.target
                )));
            }
            if !connection.weight.is_finite() {
                return Err(CurriculumError::InvalidGenome(format!(
                    "connection {} -> {} has a non-finite weight",
                    connection.source, connection.target
                )));
            }
        }
        Ok(())
    }

    fn validate_interface(&self, ids: &[NodeId], kind: NodeKind) -> Result<()> {
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in ids {
            match self.node(id) {
                Some(node) if node.kind == kind => {}
                Some(node) => {
                    return Err(CurriculumError::InvalidGenome(format!(
                        "interface node {} is {:?}, expected {:?}",
                        id, node.kind, kind
                    )))
                }
                None => {
                    return Err(CurriculumError::InvalidGenome(format!(
                        "interface node {} does not exist",
                        id
                    )))
                }
            }
            if !seen.insert(id) {
                return Err(CurriculumError::InvalidGenome(format!(
                    "interface node {} listed twice",
                    id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_minimal_genome_is_fully_connected() {
        let mut rng = StdRng::seed_from_u64(7);
        let genome = Genome::minimal(Arity::new(3, 2), &mut rng);

        assert_eq!(genome.arity(), Arity::new(3, 2));
        assert_eq!(genome.nodes().len(), 5);
        assert_eq!(genome.connections().len(), 6);
        assert!(genome.validate().is_ok());
        assert!(genome
            .connections()
            .iter()
            .all(|c| (-1.0..=1.0).contains(&c.weight)));
    }

    #[test]
    fn test_add_connection_rejects_duplicates() {
        let mut genome = Genome::empty(Arity::new(1, 1));
        genome.add_connection(NodeId(0), NodeId(1), 0.5).unwrap();
        assert!(genome.add_connection(NodeId(0), NodeId(1), 0.1).is_err());
        assert!(genome.add_connection(NodeId(0), NodeId(9), 0.1).is_err());
    }

    #[test]
    fn test_validate_catches_duplicate_pair() {
        let mut genome = Genome::empty(Arity::new(1, 1));
        genome.add_connection(NodeId(0), NodeId(1), 0.5).unwrap();
        genome.connections.push(ConnectionGene {
            source: NodeId(0),
            target: NodeId(1),
            weight: 0.2,
            enabled: false,
        });
        assert!(matches!(
            genome.validate(),
            Err(CurriculumError::InvalidGenome(_))
        ));
    }

    #[test]
    fn test_reaches() {
        let mut genome = Genome::empty(Arity::new(1, 1));
        let hidden = genome.push_node(NodeKind::Hidden, 0.0, Activation::Tanh);
        genome.add_connection(NodeId(0), hidden, 1.0).unwrap();
        genome.add_connection(hidden, NodeId(1), 1.0).unwrap();

        assert!(genome.reaches(NodeId(0), NodeId(1)));
        assert!(!genome.reaches(NodeId(1), NodeId(0)));
    }
}
