//! A parsed document snapshot plus the DOM helpers strategies share.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A rendered document and the location it was captured from.
pub struct Page {
    document: Html,
    url: String,
}

impl Page {
    #[must_use]
    pub fn parse(html: &str, url: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.to_string(),
        }
    }

    /// The document location, used as the default `source_url`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// First element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Selector`] if `selector` does not parse.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).next())
    }

    /// All elements matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Selector`] if `selector` does not parse.
    pub fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).collect())
    }

    /// Trimmed `content` attribute of the first matching `<meta>` tag, if
    /// non-empty.
    #[must_use]
    pub fn meta_content(&self, selector: &str) -> Option<String> {
        self.select_first(selector)
            .ok()
            .flatten()
            .and_then(|el| el.value().attr("content"))
            .map(clean_text)
            .filter(|s| !s.is_empty())
    }

    /// Resolves `href` against the page URL, the way a browser exposes
    /// `anchor.href`. Returns `None` when neither parses.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        match url::Url::parse(&self.url) {
            Ok(base) => base.join(href).ok().map(String::from),
            Err(_) => url::Url::parse(href).ok().map(String::from),
        }
    }
}

/// Parses a CSS selector, mapping the borrowed parse error to an owned one.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `selector` is not valid CSS.
pub fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// First descendant of `element` matching `selector`.
///
/// # Errors
///
/// Returns [`ExtractError::Selector`] if `selector` does not parse.
pub fn first_within<'a>(
    element: ElementRef<'a>,
    selector: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = parse_selector(selector)?;
    Ok(element.select(&selector).next())
}

/// Nearest ancestor of `element` with tag `name`, like DOM `closest()`
/// restricted to a tag name.
#[must_use]
pub fn closest<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

/// Rendered text of `element`: descendant text nodes outside script/style
/// blocks, whitespace-collapsed.
#[must_use]
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(&**text);
        }
    }
    clean_text(&parts.join(" "))
}

/// Collapses whitespace runs to single spaces and trims the ends.
#[must_use]
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
