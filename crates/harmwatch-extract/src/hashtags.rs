use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// `#` followed by anything except whitespace, another `#`, or sentence
/// punctuation.
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#([^\s#.,!?;:()"'«»]+)"#).expect("valid hashtag regex")
});

/// Returns every `#tag` in `text`, deduplicated case-sensitively and kept in
/// first-seen order.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| format!("#{}", m.as_str()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tags_are_deduplicated() {
        assert_eq!(extract_hashtags("#a #a #b"), vec!["#a", "#b"]);
    }

    #[test]
    fn punctuation_terminates_a_tag() {
        assert_eq!(
            extract_hashtags("Hello #world, great day! #weather"),
            vec!["#world", "#weather"]
        );
        assert_eq!(
            extract_hashtags("(#inside) \"#quoted\" #end."),
            vec!["#inside", "#quoted", "#end"]
        );
    }

    #[test]
    fn dedup_is_case_sensitive() {
        assert_eq!(extract_hashtags("#Rust #rust #Rust"), vec!["#Rust", "#rust"]);
    }

    #[test]
    fn adjacent_tags_split_on_hash() {
        assert_eq!(extract_hashtags("#one#two"), vec!["#one", "#two"]);
    }

    #[test]
    fn bare_hash_is_not_a_tag() {
        assert!(extract_hashtags("# nothing here ## ").is_empty());
        assert!(extract_hashtags("").is_empty());
    }

    #[test]
    fn unicode_tags_are_kept_whole() {
        assert_eq!(extract_hashtags("vive #été «#ça»"), vec!["#été", "#ça"]);
    }
}
