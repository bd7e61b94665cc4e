use serde::Serialize;
use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use crate::{
    error::{AppError, AppResult},
    models::Catalog,
};

/// Best candidate for a free-text query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleMatch {
    pub title: String,
    /// Confidence in [0, 100]
    pub confidence: f64,
}

/// Approximate string matching strategy
pub trait TitleMatcher: Send + Sync {
    /// Similarity of `query` to `candidate` in [0, 100]
    fn similarity(&self, query: &str, candidate: &str) -> f64;

    /// Highest-scoring candidate; exact ties go to the smallest title
    fn best_match(&self, query: &str, candidates: &[&str]) -> Option<TitleMatch> {
        let mut best: Option<TitleMatch> = None;

        for &candidate in candidates {
            let confidence = self.similarity(query, candidate);
            let better = match &best {
                None => true,
                Some(current) => {
                    confidence > current.confidence
                        || (confidence == current.confidence && candidate < current.title.as_str())
                }
            };
            if better {
                best = Some(TitleMatch {
                    title: candidate.to_string(),
                    confidence,
                });
            }
        }

        best
    }
}

/// Damerau-Levenshtein similarity over case- and whitespace-normalised text
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceMatcher;

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl TitleMatcher for EditDistanceMatcher {
    fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let query = normalize(query);
        let candidate = normalize(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0.0;
        }
        strsim::normalized_damerau_levenshtein(&query, &candidate) * 100.0
    }
}

/// Outcome of resolving one raw input against the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub input: String,
    pub title: String,
    pub confidence: f64,
    /// True when the confidence is strictly above the auto-accept threshold
    pub auto_accepted: bool,
}

impl Resolution {
    fn rejected(self) -> AppError {
        AppError::NoConfidentMatch {
            input: self.input,
            candidate: self.title,
            confidence: self.confidence,
        }
    }
}

/// Hook asked to approve candidates below the auto-accept threshold
pub trait ConfirmMatch {
    fn confirm(&mut self, candidate: &Resolution) -> bool;
}

impl<F> ConfirmMatch for F
where
    F: FnMut(&Resolution) -> bool,
{
    fn confirm(&mut self, candidate: &Resolution) -> bool {
        self(candidate)
    }
}

/// Accepts only what the matcher accepted on its own
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectUnconfirmed;

impl ConfirmMatch for RejectUnconfirmed {
    fn confirm(&mut self, _candidate: &Resolution) -> bool {
        false
    }
}

/// Accepts candidates whose canonical title the user already approved
#[derive(Debug, Clone, Default)]
pub struct ConfirmedTitles {
    titles: HashSet<String>,
}

impl ConfirmedTitles {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfirmMatch for ConfirmedTitles {
    fn confirm(&mut self, candidate: &Resolution) -> bool {
        self.titles.contains(&candidate.title)
    }
}

/// Canonical favorites plus the inputs that were turned down
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFavorites {
    pub titles: BTreeSet<String>,
    pub rejected: Vec<Resolution>,
}

/// Maps noisy user input onto canonical catalog titles
#[derive(Clone)]
pub struct TitleResolver {
    catalog: Arc<Catalog>,
    matcher: Arc<dyn TitleMatcher>,
    auto_accept_threshold: f64,
}

impl TitleResolver {
    pub fn new(catalog: Arc<Catalog>, auto_accept_threshold: f64) -> Self {
        Self::with_matcher(catalog, Arc::new(EditDistanceMatcher), auto_accept_threshold)
    }

    pub fn with_matcher(
        catalog: Arc<Catalog>,
        matcher: Arc<dyn TitleMatcher>,
        auto_accept_threshold: f64,
    ) -> Self {
        Self {
            catalog,
            matcher,
            auto_accept_threshold,
        }
    }

    /// Closest canonical title for `raw`, whatever its confidence
    pub fn resolve(&self, raw: &str) -> AppResult<Resolution> {
        let input = raw.trim();
        let candidates: Vec<&str> = self.catalog.titles().collect();

        let best = if input.is_empty() {
            None
        } else {
            self.matcher.best_match(input, &candidates)
        };

        let best = best.ok_or_else(|| AppError::NoConfidentMatch {
            input: input.to_string(),
            candidate: String::new(),
            confidence: 0.0,
        })?;

        Ok(Resolution {
            input: input.to_string(),
            auto_accepted: best.confidence > self.auto_accept_threshold,
            title: best.title,
            confidence: best.confidence,
        })
    }

    /// Resolves `raw` and asks `hook` about anything below the threshold
    pub fn resolve_confirmed(&self, raw: &str, hook: &mut dyn ConfirmMatch) -> AppResult<String> {
        let resolution = self.resolve(raw)?;
        if resolution.auto_accepted {
            tracing::debug!(
                input = %resolution.input,
                title = %resolution.title,
                confidence = resolution.confidence,
                "Title auto-accepted"
            );
            return Ok(resolution.title);
        }

        if hook.confirm(&resolution) {
            tracing::debug!(
                input = %resolution.input,
                title = %resolution.title,
                confidence = resolution.confidence,
                "Title confirmed"
            );
            Ok(resolution.title)
        } else {
            Err(resolution.rejected())
        }
    }

    /// Resolves every distinct non-blank input into a favorites set
    ///
    /// Inputs without a confident or confirmed match are skipped and listed
    /// in `rejected`; fails with `EmptyFavorites` when nothing survives.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        raw_inputs: &[S],
        hook: &mut dyn ConfirmMatch,
    ) -> AppResult<ResolvedFavorites> {
        let mut seen = HashSet::new();
        let mut favorites = ResolvedFavorites::default();

        for raw in raw_inputs {
            let input = raw.as_ref().trim();
            if input.is_empty() || !seen.insert(input.to_string()) {
                continue;
            }

            match self.resolve_confirmed(input, hook) {
                Ok(title) => {
                    favorites.titles.insert(title);
                }
                Err(AppError::NoConfidentMatch {
                    input,
                    candidate,
                    confidence,
                }) => {
                    tracing::warn!(
                        input = %input,
                        candidate = %candidate,
                        confidence,
                        "Skipping input without a confident match"
                    );
                    favorites.rejected.push(Resolution {
                        input,
                        title: candidate,
                        confidence,
                        auto_accepted: false,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if favorites.titles.is_empty() {
            return Err(AppError::EmptyFavorites);
        }

        Ok(favorites)
    }
}
