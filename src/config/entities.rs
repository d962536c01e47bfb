//! Entity list loading
//!
//! The entity list is a plain text file with one reference per line. An
//! empty or unreadable list aborts the run before any request is made.

use crate::HarvestError;
use std::path::Path;

/// Loads the ordered list of entity references from a file
///
/// Lines are trimmed, a leading `@` is stripped, and blank lines or lines
/// starting with `#` are ignored. Order and duplicates are preserved.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - At least one entity reference
/// * `Err(HarvestError::Precondition)` - The file is unreadable or holds no entities
pub fn load_entity_list(path: &Path) -> Result<Vec<String>, HarvestError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        HarvestError::Precondition(format!(
            "cannot read entity list {}: {}",
            path.display(),
            e
        ))
    })?;

    let entities = parse_entity_list(&content);
    if entities.is_empty() {
        return Err(HarvestError::Precondition(format!(
            "entity list {} is empty",
            path.display()
        )));
    }

    Ok(entities)
}

/// Parses entity references from the text of an entity list
pub fn parse_entity_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.trim_start_matches('@').to_string())
        .filter(|entity| !entity.is_empty())
        .collect()
}
