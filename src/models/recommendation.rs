use serde::{Deserialize, Serialize};

/// A ranked catalog entry with its cosine similarity to the query vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    /// Cosine similarity in [-1, 1]
    pub similarity: f64,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, similarity: f64) -> Self {
        Self {
            title: title.into(),
            similarity,
        }
    }

    /// Display score in [0, 100]
    pub fn percent(&self) -> u8 {
        similarity_percent(self.similarity)
    }
}

/// Rescales a cosine similarity to a whole percentage
///
/// `percent = (similarity + 1) / 2 * 100`, rounded half up.
pub fn similarity_percent(similarity: f64) -> u8 {
    let scaled = (similarity + 1.0) / 2.0 * 100.0;
    (scaled + 0.5).floor().clamp(0.0, 100.0) as u8
}
