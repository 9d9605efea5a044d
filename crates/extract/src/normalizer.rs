/// Category used when the annotator provides no type.
pub const FALLBACK_TYPE: &str = "Thing";

/// Normalize a label into its matching key: trimmed and lowercased.
/// Returns `None` for labels that are blank.
pub fn canonical_key(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Reduce the first type candidate to its most specific path component,
/// e.g. `http://dbpedia.org/ontology/Person` -> `Person`.
pub fn classify_type(types: &[String]) -> String {
    types
        .first()
        .and_then(|t| t.trim().trim_end_matches('/').rsplit('/').next())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_TYPE.to_string())
}
