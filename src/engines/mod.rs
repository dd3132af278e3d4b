pub mod generation;
pub mod evaluation;
pub mod curriculum;
