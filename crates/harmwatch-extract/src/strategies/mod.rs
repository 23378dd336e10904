//! Extraction strategies, most specific first.

mod generic;
mod jsonld;
mod twitter;

pub use generic::GenericStrategy;
pub use jsonld::JsonLdStrategy;
pub use twitter::TwitterStrategy;

use crate::candidate::ExtractionCandidate;
use crate::error::ExtractError;
use crate::page::Page;

/// One way of finding post content on a page.
///
/// `Ok(None)` means the strategy does not recognise the page. Errors are
/// logged and treated the same as `Ok(None)` by the chain.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Attempts to pull a candidate out of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the strategy fails internally.
    fn extract(&self, page: &Page) -> Result<Option<ExtractionCandidate>, ExtractError>;
}
