use std::{cmp::Ordering, collections::BTreeSet};

use crate::{
    error::{AppError, AppResult},
    models::{Embedding, Recommendation},
    services::vector_store::VectorStore,
};

/// Ranks catalog shows by cosine similarity to a favorites query vector
///
/// All arithmetic is accumulated in `f64` and performed sequentially in
/// catalog order, so a fixed catalog and favorites set always produce the
/// same ranking.
pub struct SimilarityEngine<'a> {
    store: &'a VectorStore,
}

impl<'a> SimilarityEngine<'a> {
    pub fn new(store: &'a VectorStore) -> Self {
        Self { store }
    }

    /// Element-wise mean of the favorites' vectors
    pub fn query_vector(&self, favorites: &BTreeSet<String>) -> AppResult<Embedding> {
        let mut titles = favorites.iter();
        let first = titles.next().ok_or(AppError::EmptyFavorites)?;
        let first_vector = self.store.vector_of(first)?;

        let dimensions = first_vector.len();
        let mut sum: Vec<f64> = first_vector.iter().map(|&x| f64::from(x)).collect();

        for title in titles {
            let vector = self.store.vector_of(title)?;
            if vector.len() != dimensions {
                return Err(AppError::DimensionMismatch {
                    title: title.clone(),
                    expected: dimensions,
                    found: vector.len(),
                });
            }
            for (acc, &x) in sum.iter_mut().zip(vector) {
                *acc += f64::from(x);
            }
        }

        let count = favorites.len() as f64;
        Ok(sum.into_iter().map(|x| (x / count) as f32).collect())
    }

    /// Top `top_n` shows outside `excluding`, best first
    ///
    /// Ties on score are ordered by title. Fails with `ZeroVector` when the
    /// query or any compared show has zero norm.
    pub fn rank(
        &self,
        query: &[f32],
        excluding: &BTreeSet<String>,
        top_n: usize,
    ) -> AppResult<Vec<Recommendation>> {
        if norm(query) == 0.0 {
            return Err(AppError::ZeroVector("query".to_string()));
        }

        let mut scored = Vec::with_capacity(self.store.catalog().len());
        for show in self.store.catalog().shows() {
            if excluding.contains(show.title) {
                continue;
            }
            if show.vector.len() != query.len() {
                return Err(AppError::DimensionMismatch {
                    title: show.title.to_string(),
                    expected: query.len(),
                    found: show.vector.len(),
                });
            }

            let similarity = cosine_similarity(query, show.vector)
                .ok_or_else(|| AppError::ZeroVector(show.title.to_string()))?;
            scored.push(Recommendation::new(show.title, similarity));
        }

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        scored.truncate(top_n);

        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

fn norm(v: &[f32]) -> f64 {
    dot(v, v).sqrt()
}

/// Cosine similarity in [-1, 1]; `None` when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    let denom = norm(a) * norm(b);
    if denom == 0.0 || a.len() != b.len() {
        return None;
    }
    Some(dot(a, b) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Catalog;
    use std::collections::BTreeMap;

    fn store(shows: &[(&str, Vec<f32>)]) -> VectorStore {
        let map: BTreeMap<String, Vec<f32>> = shows
            .iter()
            .map(|(t, v)| (t.to_string(), v.clone()))
            .collect();
        VectorStore::from_catalog(Catalog::new(map).unwrap())
    }

    fn set(titles: &[&str]) -> BTreeSet<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    fn toy_store() -> VectorStore {
        store(&[
            ("A", vec![1.0, 0.0]),
            ("B", vec![0.0, 1.0]),
            ("C", vec![1.0, 1.0]),
        ])
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3, -1.2, 4.5, 0.01];
        let similarity = cosine_similarity(&v, &v).unwrap();
        assert!((similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_scores_identical_show_as_one() {
        let v = vec![0.3, -1.2, 4.5, 0.01];
        let store = store(&[("Twin", v.clone()), ("Other", vec![1.0, 0.0, 0.0, 0.0])]);
        let engine = SimilarityEngine::new(&store);

        let ranked = engine.rank(&v, &BTreeSet::new(), 2).unwrap();
        assert_eq!(ranked[0].title, "Twin");
        assert!((ranked[0].similarity - 1.0).abs() < 1e-12);
        assert_eq!(ranked[0].percent(), 100);
    }

    #[test]
    fn test_cosine_zero_vector_is_none() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn test_query_vector_is_mean() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        let query = engine.query_vector(&set(&["A", "B"])).unwrap();
        assert_eq!(query, vec![0.5, 0.5]);
    }

    #[test]
    fn test_query_vector_empty_favorites() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        assert!(matches!(
            engine.query_vector(&BTreeSet::new()),
            Err(AppError::EmptyFavorites)
        ));
    }

    #[test]
    fn test_query_vector_unknown_title() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        assert!(matches!(
            engine.query_vector(&set(&["A", "Z"])),
            Err(AppError::UnknownTitle(t)) if t == "Z"
        ));
    }

    #[test]
    fn test_rank_orders_by_cosine() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        let favorites = set(&["A"]);

        let query = engine.query_vector(&favorites).unwrap();
        let ranked = engine.rank(&query, &favorites, 2).unwrap();

        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B"]);
        assert!((ranked[0].similarity - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert_eq!(ranked[1].similarity, 0.0);
        assert_eq!(ranked[1].percent(), 50);
    }

    #[test]
    fn test_rank_excludes_favorites() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        let favorites = set(&["A", "C"]);

        let query = engine.query_vector(&favorites).unwrap();
        let ranked = engine.rank(&query, &favorites, 10).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "B");
    }

    #[test]
    fn test_rank_top_n_larger_than_catalog() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        let ranked = engine.rank(&[1.0, 0.0], &set(&["A"]), 100).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_ties_are_lexicographic() {
        let store = store(&[
            ("Query", vec![1.0, 0.0]),
            ("Zeta", vec![0.0, 1.0]),
            ("Alpha", vec![0.0, 2.0]),
            ("Mid", vec![0.0, 3.0]),
        ]);
        let engine = SimilarityEngine::new(&store);
        let ranked = engine.rank(&[1.0, 0.0], &set(&["Query"]), 3).unwrap();

        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let store = store(&[
            ("A", vec![0.9, 0.1, 0.3]),
            ("B", vec![0.2, 0.8, 0.5]),
            ("C", vec![0.4, 0.4, 0.4]),
            ("D", vec![-0.5, 0.2, 0.9]),
            ("E", vec![0.7, -0.3, 0.1]),
        ]);
        let engine = SimilarityEngine::new(&store);
        let favorites = set(&["A", "D"]);
        let query = engine.query_vector(&favorites).unwrap();

        let first = engine.rank(&query, &favorites, 3).unwrap();
        let second = engine.rank(&query, &favorites, 3).unwrap();
        assert_eq!(first, second);

        for pair in first.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_zero_vector_in_catalog() {
        let store = store(&[("A", vec![1.0, 0.0]), ("Blank", vec![0.0, 0.0])]);
        let engine = SimilarityEngine::new(&store);

        let result = engine.rank(&[1.0, 0.0], &set(&["A"]), 5);
        assert!(matches!(result, Err(AppError::ZeroVector(t)) if t == "Blank"));
    }

    #[test]
    fn test_zero_query_vector() {
        let store = store(&[("A", vec![1.0, 0.0]), ("B", vec![-1.0, 0.0])]);
        let engine = SimilarityEngine::new(&store);

        let query = engine.query_vector(&set(&["A", "B"])).unwrap();
        let result = engine.rank(&query, &set(&["A", "B"]), 5);
        assert!(matches!(result, Err(AppError::ZeroVector(_))));
    }

    #[test]
    fn test_rank_dimension_mismatch() {
        let store = toy_store();
        let engine = SimilarityEngine::new(&store);
        let result = engine.rank(&[1.0, 0.0, 0.0], &BTreeSet::new(), 5);
        assert!(matches!(result, Err(AppError::DimensionMismatch { .. })));
    }
}
