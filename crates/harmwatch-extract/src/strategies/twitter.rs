//! Twitter / X timeline and status pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::ExtractionStrategy;
use crate::candidate::ExtractionCandidate;
use crate::error::ExtractError;
use crate::page::{closest, first_within, visible_text, Page};

const ARTICLE_SELECTOR: &str = r#"article[role="article"], article[data-testid="tweet"]"#;

/// Attributes that carry a machine-readable time, in order of preference.
const TIME_ATTRS: &[&str] = &["datetime", "data-time", "data-timestamp", "title"];

static PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:twitter|x)\.com/([^/?#]+)").expect("valid profile link regex")
});
static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"status/(\d+)").expect("valid status link regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct TwitterStrategy;

impl ExtractionStrategy for TwitterStrategy {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn extract(&self, page: &Page) -> Result<Option<ExtractionCandidate>, ExtractError> {
        let Some(article) = page.select_first(ARTICLE_SELECTOR)? else {
            return Ok(None);
        };

        let content = first_within(article, "div[lang]")?.unwrap_or(article);
        let post_text = visible_text(content);

        let user_id = first_within(article, r#"a[href*="/"]"#)?
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| page.resolve(href))
            .and_then(|href| capture(&PROFILE_RE, &href));

        let permalink = match first_within(article, r#"a[href*="/status/"]"#)? {
            Some(a) => Some(a),
            None => first_within(article, "a time")?.and_then(|time| closest(time, "a")),
        };
        let post_id = permalink
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| capture(&STATUS_RE, href));

        let timestamp = first_within(article, "time")?.and_then(timestamp_from_element);

        Ok(Some(ExtractionCandidate {
            platform: Some(self.name().to_string()),
            post_id,
            user_id,
            timestamp,
            post_text,
            likes: counter(article, r#"[data-testid="like"]"#)?,
            comments: counter(article, r#"[data-testid="reply"]"#)?,
            shares: counter(article, r#"[data-testid="retweet"]"#)?,
            ..ExtractionCandidate::default()
        }))
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Reads a timestamp from the first populated time attribute, falling back
/// to the element's text.
fn timestamp_from_element(el: ElementRef<'_>) -> Option<String> {
    TIME_ATTRS
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| Some(visible_text(el)).filter(|t| !t.is_empty()))
}

fn counter(article: ElementRef<'_>, selector: &str) -> Result<Option<String>, ExtractError> {
    Ok(first_within(article, selector)?
        .map(visible_text)
        .filter(|t| !t.is_empty()))
}
