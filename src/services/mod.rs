pub mod dataset;
pub mod embeddings;
pub mod recommendations;
pub mod similarity;
pub mod title_resolver;
pub mod vector_store;

pub use recommendations::{RecommendationRun, Recommender};
pub use vector_store::{VectorStore, VectorStoreLoader};
