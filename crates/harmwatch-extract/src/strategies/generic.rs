//! Last-resort heuristic for arbitrary pages.

use super::ExtractionStrategy;
use crate::candidate::ExtractionCandidate;
use crate::error::ExtractError;
use crate::page::{visible_text, Page};

const CONTAINER_SELECTOR: &str = "p, article, div";

/// Descriptive metadata consulted when no container has text.
const DESCRIPTION_META: &[&str] = &[
    r#"meta[property="og:description"]"#,
    r#"meta[name="description"]"#,
];

/// Picks the container with the most rendered text. Always produces a
/// candidate, which may have empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl ExtractionStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, page: &Page) -> Result<Option<ExtractionCandidate>, ExtractError> {
        let mut post_text = String::new();
        let mut best_len = 0;
        for container in page.select_all(CONTAINER_SELECTOR)? {
            let text = visible_text(container);
            let len = text.chars().count();
            if len > best_len {
                best_len = len;
                post_text = text;
            }
        }

        if post_text.is_empty() {
            post_text = DESCRIPTION_META
                .iter()
                .find_map(|selector| page.meta_content(selector))
                .unwrap_or_default();
        }

        Ok(Some(ExtractionCandidate {
            platform: Some(self.name().to_string()),
            user_id: page.meta_content(r#"meta[name="author"]"#),
            post_text,
            source_url: Some(page.url().to_string()),
            ..ExtractionCandidate::default()
        }))
    }
}
