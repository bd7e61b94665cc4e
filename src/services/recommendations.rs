use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    services::{
        similarity::SimilarityEngine,
        title_resolver::{ConfirmMatch, Resolution, TitleResolver},
        vector_store::VectorStore,
    },
};

pub const DEFAULT_TOP_N: usize = 5;

/// Ranked shows plus the favorites that could not be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRun {
    pub recommendations: Vec<Recommendation>,
    /// Inputs skipped for lack of a confident or confirmed match
    pub rejected: Vec<Resolution>,
}

/// Generates recommendations from a user's favorite shows
///
/// Resolves the raw favorites to canonical titles, averages their vectors,
/// and ranks the rest of the catalog against that average. Holds nothing
/// between calls beyond read access to the catalog.
#[derive(Clone)]
pub struct Recommender {
    store: VectorStore,
    resolver: TitleResolver,
}

impl Recommender {
    pub fn new(store: VectorStore, auto_accept_threshold: f64) -> Self {
        let resolver = TitleResolver::new(store.shared_catalog(), auto_accept_threshold);
        Self { store, resolver }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn resolver(&self) -> &TitleResolver {
        &self.resolver
    }

    /// Top `top_n` shows similar to `raw_favorites`, favorites excluded
    ///
    /// `hook` is consulted for every fuzzy match below the auto-accept
    /// threshold; inputs it turns down come back in `rejected`. Downstream
    /// errors propagate unchanged.
    pub fn recommend<S: AsRef<str>>(
        &self,
        raw_favorites: &[S],
        top_n: usize,
        hook: &mut dyn ConfirmMatch,
    ) -> AppResult<RecommendationRun> {
        if raw_favorites.iter().all(|s| s.as_ref().trim().is_empty()) {
            return Err(AppError::EmptyFavorites);
        }

        let favorites = self.resolver.resolve_all(raw_favorites, hook)?;
        let engine = SimilarityEngine::new(&self.store);
        let query = engine.query_vector(&favorites.titles)?;
        let recommendations = engine.rank(&query, &favorites.titles, top_n)?;

        tracing::info!(
            favorites = ?favorites.titles,
            rejected = favorites.rejected.len(),
            results = recommendations.len(),
            "Recommendations generated"
        );

        Ok(RecommendationRun {
            recommendations,
            rejected: favorites.rejected,
        })
    }
}
