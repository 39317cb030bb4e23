pub mod engine;
pub mod query;
pub mod similarity;

pub use engine::SearchEngine;
pub use query::{SearchMatch, SearchParams, SearchStrategy};
pub use similarity::{levenshtein_distance, similarity};
