//! Ordered strategy selection.

use chrono::{DateTime, Utc};
use harmwatch_core::NormalizedPost;

use crate::candidate::ExtractionCandidate;
use crate::normalize::normalize;
use crate::page::Page;
use crate::parse::rewrite_timestamp;
use crate::strategies::{
    ExtractionStrategy, GenericStrategy, JsonLdStrategy, TwitterStrategy,
};

/// Strategies tried most-specific first, with the generic heuristic as the
/// unconditional fallback.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    fallback: GenericStrategy,
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(TwitterStrategy),
            Box::new(JsonLdStrategy),
            Box::new(GenericStrategy),
        ])
    }
}

impl ExtractorChain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self {
            strategies,
            fallback: GenericStrategy,
        }
    }

    #[cfg(test)]
    fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the strategies against `page` and normalizes the first
    /// candidate with text.
    ///
    /// Strategy failures are logged and skipped. If nothing matches, the
    /// generic fallback's result is used even when its text is empty, so
    /// this always returns a record.
    #[must_use]
    pub fn extract(&self, page: &Page, now: DateTime<Utc>) -> NormalizedPost {
        let mut candidate = self.select(page);
        candidate.timestamp = candidate.timestamp.map(rewrite_timestamp);
        normalize(candidate, page.url(), now)
    }

    fn select(&self, page: &Page) -> ExtractionCandidate {
        for strategy in &self.strategies {
            match strategy.extract(page) {
                Ok(Some(candidate)) if candidate.has_text() => {
                    tracing::debug!(strategy = strategy.name(), "extraction candidate accepted");
                    return candidate;
                }
                Ok(_) => {
                    tracing::trace!(strategy = strategy.name(), "no candidate");
                }
                Err(e) => {
                    tracing::debug!(strategy = strategy.name(), error = %e, "strategy failed");
                }
            }
        }

        tracing::debug!("no strategy matched; accepting generic fallback");
        match self.fallback.extract(page) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => ExtractionCandidate::default(),
            Err(e) => {
                tracing::debug!(error = %e, "generic fallback failed");
                ExtractionCandidate::default()
            }
        }
    }
}

/// Parses `html` captured at `url` and extracts one record with the
/// default chain.
#[must_use]
pub fn extract_from_html(html: &str, url: &str, now: DateTime<Utc>) -> NormalizedPost {
    let page = Page::parse(html, url);
    ExtractorChain::default().extract(&page, now)
}
