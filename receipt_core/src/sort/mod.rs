pub mod algorithm;
pub mod engine;

pub use algorithm::SortAlgorithm;
pub use engine::SortEngine;
