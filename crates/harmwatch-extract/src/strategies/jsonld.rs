//! schema.org posts embedded as `application/ld+json` blocks.

use serde_json::{Map, Value};

use super::ExtractionStrategy;
use crate::candidate::ExtractionCandidate;
use crate::error::ExtractError;
use crate::page::{clean_text, Page};

const SCRIPT_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// `@type` fragments that mark a node as user-authored content.
const POST_TYPE_TOKENS: &[&str] = &["posting", "article", "pressrelease", "comment"];

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLdStrategy;

impl ExtractionStrategy for JsonLdStrategy {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, page: &Page) -> Result<Option<ExtractionCandidate>, ExtractError> {
        let mut best: Option<ExtractionCandidate> = None;
        let mut parsed_any = false;
        let mut last_error = None;

        for script in page.select_all(SCRIPT_SELECTOR)? {
            let raw = script.text().collect::<String>();
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value = match serde_json::from_str::<Value>(raw) {
                Ok(value) => value,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };
            parsed_any = true;

            let mut nodes = Vec::new();
            collect_post_nodes(&value, &mut nodes);
            for node in nodes {
                let candidate = candidate_from_node(node, self.name());
                let longer = best
                    .as_ref()
                    .is_none_or(|b| candidate.post_text.len() > b.post_text.len());
                if candidate.has_text() && longer {
                    best = Some(candidate);
                }
            }
        }

        match (parsed_any, last_error) {
            (false, Some(e)) => Err(ExtractError::StructuredData(e)),
            _ => Ok(best),
        }
    }
}

fn collect_post_nodes<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            if looks_like_post(map.get("@type")) {
                out.push(map);
            }
            for child in map.values() {
                collect_post_nodes(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_post_nodes(child, out);
            }
        }
        _ => {}
    }
}

fn looks_like_post(node_type: Option<&Value>) -> bool {
    let matches = |s: &str| {
        let lower = s.to_lowercase();
        POST_TYPE_TOKENS.iter().any(|token| lower.contains(token))
    };
    match node_type {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn candidate_from_node(node: &Map<String, Value>, platform: &str) -> ExtractionCandidate {
    let post_text = ["articleBody", "text", "description"]
        .iter()
        .find_map(|key| node.get(*key).and_then(Value::as_str))
        .map(clean_text)
        .unwrap_or_default();

    let user_id = node.get("author").and_then(author_name);

    let timestamp = ["datePublished", "dateCreated"]
        .iter()
        .find_map(|key| node.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    let post_id = node.get("identifier").and_then(scalar_string);

    let source_url = node
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string);

    let stats = node.get("interactionStatistic");
    ExtractionCandidate {
        platform: Some(platform.to_string()),
        post_id,
        user_id,
        timestamp,
        post_text,
        likes: interaction_count(stats, &["like"]),
        comments: node
            .get("commentCount")
            .and_then(scalar_string)
            .or_else(|| interaction_count(stats, &["comment", "reply"])),
        shares: interaction_count(stats, &["share"]),
        source_url,
        ..ExtractionCandidate::default()
    }
}

/// `author` may be a name, a Person node, or a list of either.
fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::String(s) => Some(clean_text(s)).filter(|s| !s.is_empty()),
        Value::Object(map) => ["alternateName", "name"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(clean_text)
            .filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finds the `userInteractionCount` of the first `InteractionCounter` whose
/// `interactionType` mentions one of `tokens`.
fn interaction_count(stats: Option<&Value>, tokens: &[&str]) -> Option<String> {
    let counters: Vec<&Value> = match stats? {
        Value::Array(items) => items.iter().collect(),
        single @ Value::Object(_) => vec![single],
        _ => return None,
    };
    counters.into_iter().find_map(|counter| {
        let kind = match counter.get("interactionType")? {
            Value::String(s) => s.to_lowercase(),
            Value::Object(map) => map.get("@type")?.as_str()?.to_lowercase(),
            _ => return None,
        };
        if tokens.iter().any(|token| kind.contains(token)) {
            counter.get("userInteractionCount").and_then(scalar_string)
        } else {
            None
        }
    })
}
