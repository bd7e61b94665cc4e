use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};

/// Semantic vector for a show description
pub type Embedding = Vec<f32>;

/// A dataset row as supplied by the dataset collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowRecord {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Description", default)]
    pub description: String,
    #[serde(alias = "Genres", default)]
    pub genres: String,
}

impl ShowRecord {
    pub fn new(title: &str, description: &str, genres: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            genres: genres.to_string(),
        }
    }

    /// Text handed to the embedding collaborator
    pub fn embedding_text(&self) -> String {
        let genres = self.genres.trim();
        let description = self.description.trim();
        if genres.is_empty() {
            description.to_string()
        } else {
            format!("{} - {}", genres, description)
        }
    }
}

/// Canonical show entry: a unique title plus its vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Show<'a> {
    pub title: &'a str,
    pub vector: &'a [f32],
}

/// The full title to vector mapping, immutable once built
///
/// Titles are kept in a `BTreeMap` so every iteration over the catalog
/// visits shows in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    shows: BTreeMap<String, Embedding>,
    dimensions: usize,
}

impl Catalog {
    /// Builds a catalog, rejecting vectors whose length disagrees with the rest
    pub fn new(shows: BTreeMap<String, Embedding>) -> AppResult<Self> {
        let dimensions = shows.values().next().map(Vec::len).unwrap_or(0);

        for (title, vector) in &shows {
            if vector.len() != dimensions {
                return Err(AppError::DimensionMismatch {
                    title: title.clone(),
                    expected: dimensions,
                    found: vector.len(),
                });
            }
        }

        Ok(Self { shows, dimensions })
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn get(&self, title: &str) -> Option<&[f32]> {
        self.shows.get(title).map(Vec::as_slice)
    }

    /// Canonical titles in lexicographic order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.shows.keys().map(String::as_str)
    }

    pub fn shows(&self) -> impl Iterator<Item = Show<'_>> {
        self.shows.iter().map(|(title, vector)| Show {
            title: title.as_str(),
            vector: vector.as_slice(),
        })
    }

    pub fn as_map(&self) -> &BTreeMap<String, Embedding> {
        &self.shows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_joins_genres_and_description() {
        let record = ShowRecord::new("Breaking Bad", "A chemistry teacher turns to crime.", "Crime, Drama");
        assert_eq!(
            record.embedding_text(),
            "Crime, Drama - A chemistry teacher turns to crime."
        );
    }

    #[test]
    fn test_embedding_text_without_genres() {
        let record = ShowRecord::new("Friends", "Six friends in Manhattan.", "  ");
        assert_eq!(record.embedding_text(), "Six friends in Manhattan.");
    }

    #[test]
    fn test_record_accepts_capitalized_fields() {
        let json = r#"{"Title": "Dark", "Description": "Time travel in a small town.", "Genres": "Sci-Fi"}"#;
        let record: ShowRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, ShowRecord::new("Dark", "Time travel in a small town.", "Sci-Fi"));
    }

    #[test]
    fn test_catalog_rejects_mixed_dimensions() {
        let mut shows = BTreeMap::new();
        shows.insert("A".to_string(), vec![1.0, 0.0]);
        shows.insert("B".to_string(), vec![1.0, 0.0, 0.0]);

        match Catalog::new(shows) {
            Err(AppError::DimensionMismatch { title, expected, found }) => {
                assert_eq!(title, "B");
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_titles_are_sorted() {
        let mut shows = BTreeMap::new();
        shows.insert("The Wire".to_string(), vec![1.0]);
        shows.insert("Dark".to_string(), vec![1.0]);
        shows.insert("Lost".to_string(), vec![1.0]);

        let catalog = Catalog::new(shows).unwrap();
        let titles: Vec<&str> = catalog.titles().collect();
        assert_eq!(titles, vec!["Dark", "Lost", "The Wire"]);
        assert_eq!(catalog.dimensions(), 1);
    }
}
