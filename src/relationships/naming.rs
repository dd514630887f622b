//! Name heuristic for reference targets
//!
//! A reference field's name is reduced to a root by the first matching suffix
//! rule, then lower-cased and pluralized into a candidate collection name.

/// One suffix stripping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRule {
    pub suffix: &'static str,
}

impl SuffixRule {
    pub const fn new(suffix: &'static str) -> Self {
        Self { suffix }
    }

    /// Strip the suffix, returning the remaining root
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_suffix(self.suffix)
    }
}

/// Suffix rules in evaluation order; the first match wins
///
/// Plural identifier lists such as `tag_ids` match no rule and keep their
/// full name as the root.
pub const SUFFIX_RULES: [SuffixRule; 4] = [
    SuffixRule::new("_id"),
    SuffixRule::new("Id"),
    SuffixRule::new("Ref"),
    SuffixRule::new("Reference"),
];

/// Reduce a field name to its root using [`SUFFIX_RULES`]
///
/// Names matching no rule are returned whole.
pub fn strip_reference_suffix(name: &str) -> &str {
    SUFFIX_RULES
        .iter()
        .find_map(|rule| rule.strip(name))
        .unwrap_or(name)
}

/// Naive English pluralization: append `s` unless already present
pub fn pluralize(root: &str) -> String {
    if root.ends_with('s') {
        root.to_string()
    } else {
        format!("{}s", root)
    }
}

/// Candidate collection name for a reference field
///
/// Uses the last segment of a dotted path. Returns `None` when stripping
/// leaves nothing.
pub fn candidate_collection(field_path: &str) -> Option<String> {
    let name = field_path.rsplit('.').next().unwrap_or(field_path);
    let root = strip_reference_suffix(name);
    if root.is_empty() {
        return None;
    }
    Some(pluralize(&root.to_lowercase()))
}

/// Find `candidate` among `known` collections
///
/// Exact matches are preferred over case-insensitive ones. Returns the known
/// spelling.
pub fn resolve_known<'a>(candidate: &str, known: &'a [String]) -> Option<&'a str> {
    known
        .iter()
        .find(|name| name.as_str() == candidate)
        .or_else(|| known.iter().find(|name| name.eq_ignore_ascii_case(candidate)))
        .map(String::as_str)
}
