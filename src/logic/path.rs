use crate::error::{ResolveError, ResolveResult};

pub const PATH_SEPARATOR: char = '/';

/// A template `name` split into its hierarchical parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Name of the targeted entity
    pub leaf: String,
    /// Whether the name was written as an absolute path
    pub is_path: bool,
    /// Every non-empty segment, leaf included
    pub segments: Vec<String>,
}

impl ParsedName {
    /// Folder segments above the leaf
    pub fn ancestors(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

/// Interpret a `name` as either a bare name or an absolute path.
///
/// Empty segments are dropped, so `/a//b/` and `/a/b` are the same path.
pub fn parse_name(name: &str) -> ResolveResult<ParsedName> {
    if !name.contains(PATH_SEPARATOR) {
        return Ok(ParsedName {
            leaf: name.to_string(),
            is_path: false,
            segments: vec![name.to_string()],
        });
    }

    if !name.starts_with(PATH_SEPARATOR) {
        return Err(ResolveError::invalid_path(name, "must be absolute"));
    }

    let segments: Vec<String> = name
        .split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    let Some(leaf) = segments.last().cloned() else {
        return Err(ResolveError::invalid_path(name, "must target something"));
    };

    Ok(ParsedName {
        leaf,
        is_path: true,
        segments,
    })
}
