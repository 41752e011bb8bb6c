//! Search over displayable records.
//!
//! A query is compiled as a regex when it parses, otherwise treated as a
//! plain substring. Matching scans the serialized representation of each
//! record recursively, so a query hits ids, urls, header values, body
//! text, anything the server sent.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Compiled query matcher.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Empty query: everything matches.
    All,
    Pattern(Regex),
    /// Fallback for queries that do not parse as a pattern. The needle
    /// is pre-lowercased when matching case-insensitively.
    Substring { needle: String, case_sensitive: bool },
}

impl Matcher {
    /// Compile a query string.
    ///
    /// Malformed pattern syntax falls back to substring containment
    /// rather than erroring; an unconfigured search box is the normal
    /// state, not a failure.
    pub fn compile(query: &str, case_sensitive: bool) -> Self {
        if query.is_empty() {
            return Matcher::All;
        }
        let pattern = if case_sensitive {
            query.to_string()
        } else {
            format!("(?i){}", query)
        };
        match Regex::new(&pattern) {
            Ok(regex) => Matcher::Pattern(regex),
            Err(_) => Matcher::Substring {
                needle: if case_sensitive {
                    query.to_string()
                } else {
                    query.to_lowercase()
                },
                case_sensitive,
            },
        }
    }

    /// Test one field value.
    pub fn matches_str(&self, haystack: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Pattern(regex) => regex.is_match(haystack),
            Matcher::Substring {
                needle,
                case_sensitive,
            } => {
                if *case_sensitive {
                    haystack.contains(needle.as_str())
                } else {
                    haystack.to_lowercase().contains(needle.as_str())
                }
            }
        }
    }

    /// Recursively test every field value of a JSON document.
    pub fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::String(s) => self.matches_str(s),
            Value::Bool(b) => self.matches_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.matches_str(&n.to_string()),
            Value::Array(items) => items.iter().any(|v| self.matches_value(v)),
            Value::Object(map) => map.values().any(|v| self.matches_value(v)),
        }
    }
}

/// Filter a record sequence by query.
///
/// Empty query returns the input unchanged; otherwise the result is the
/// order-preserving subsequence of records whose serialized field values
/// match. Records that fail to serialize are skipped.
pub fn filter<T: Serialize>(items: Vec<T>, query: &str, case_sensitive: bool) -> Vec<T> {
    if query.is_empty() {
        return items;
    }
    let matcher = Matcher::compile(query, case_sensitive);
    items
        .into_iter()
        .filter(|item| {
            serde_json::to_value(item)
                .map(|v| matcher.matches_value(&v))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StubMapping;
    use serde_json::json;

    fn mappings() -> Vec<StubMapping> {
        [
            json!({"id": "m1", "name": "List users", "request": {"method": "GET", "url": "/api/users"}, "response": {"status": 200}}),
            json!({"id": "m2", "name": "Create order", "request": {"method": "POST", "url": "/api/orders"}, "response": {"status": 201, "jsonBody": {"total": 42}}}),
            json!({"id": "m3", "name": "Upstream", "request": {"method": "ANY", "urlPattern": "/legacy/.*"}, "response": {"proxyBaseUrl": "https://old.example"}}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
    }

    fn ids(items: &[StubMapping]) -> Vec<&str> {
        items.iter().map(|m| m.key()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let input = mappings();
        let expected = ids(&input);
        let out = filter(mappings(), "", true);
        assert_eq!(ids(&out), expected);
    }

    #[test]
    fn test_results_are_subset_and_order_preserving() {
        let out = filter(mappings(), "api", true);
        assert_eq!(ids(&out), vec!["m1", "m2"]);
    }

    #[test]
    fn test_matches_nested_field_values() {
        let out = filter(mappings(), "42", true);
        assert_eq!(ids(&out), vec!["m2"]);
    }

    #[test]
    fn test_case_insensitive_by_default_flag() {
        let out = filter(mappings(), "LIST USERS", false);
        assert_eq!(ids(&out), vec!["m1"]);
        let out = filter(mappings(), "LIST USERS", true);
        assert!(out.is_empty());
    }

    #[test]
    fn test_query_compiles_as_pattern() {
        let out = filter(mappings(), "^/api/(users|orders)$", true);
        assert_eq!(ids(&out), vec!["m1", "m2"]);
    }

    #[test]
    fn test_malformed_pattern_falls_back_to_substring() {
        // "(" is not a valid pattern; as a substring it hits nothing here.
        let out = filter(mappings(), "(", true);
        assert!(out.is_empty());

        // "/legacy/.*" appears literally in m3's urlPattern.
        let out = filter(mappings(), "[invalid(", false);
        assert!(out.is_empty());
    }

    #[test]
    fn test_substring_fallback_still_matches_literals() {
        // Invalid as a regex (unbalanced bracket) but present literally.
        let mut items = mappings();
        items[0].name = Some("weird [tag".to_string());
        let out = filter(items, "[tag", false);
        assert_eq!(ids(&out), vec!["m1"]);
    }

    #[test]
    fn test_numbers_and_bools_are_searchable() {
        let out = filter(mappings(), "201", true);
        assert_eq!(ids(&out), vec!["m2"]);
    }

    #[test]
    fn test_no_items_invented() {
        let out = filter(Vec::<StubMapping>::new(), "anything", false);
        assert!(out.is_empty());
    }
}
