pub mod recommendation;
pub mod show;

pub use recommendation::{similarity_percent, Recommendation};
pub use show::{Catalog, Embedding, Show, ShowRecord};
