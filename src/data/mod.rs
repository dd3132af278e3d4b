pub mod genome_store;

pub use genome_store::{GenomeFileName, GenomeStore};
