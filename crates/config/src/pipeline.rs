//! Config path pipeline
//!
//! A pipeline is an ordered list of template fragments such as
//! `["{package_name}", "{config_dir}", "{target}"]`. Each fragment becomes
//! one path segment appended to a base.
//!
//! Fragments are formatted with one substitution key at a time. The first key
//! that formats the whole fragment wins; when none does, the fragment is
//! kept verbatim. A consequence is that a fragment naming two different keys
//! (`"{package_name}{config_dir}"`) never resolves and always ends up in the
//! path as written.
//!
//! Placeholders are bare names. Conversions (`{target!r}`) and format specs
//! (`{target:>8}`) are rejected as malformed.

use indexmap::IndexMap;
use std::path::PathBuf;
use velcro_core::{Error, Result};

/// Recognized substitution keys, in the order they are tried
pub const SUBSTITUTION_KEYS: [&str; 3] = ["package_name", "config_dir", "target"];

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Brace(char),
    Field(&'a str),
}

/// Split a fragment into literal text, escaped braces and `{field}` names
fn parse(fragment: &str) -> Result<Vec<Piece<'_>>> {
    let mut pieces = Vec::new();
    let mut rest = fragment;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            pieces.push(Piece::Text(&rest[..pos]));
        }
        let brace = rest.as_bytes()[pos];
        let after = &rest[pos + 1..];

        if brace == b'}' {
            if let Some(tail) = after.strip_prefix('}') {
                pieces.push(Piece::Brace('}'));
                rest = tail;
                continue;
            }
            return Err(Error::PathBuild(format!(
                "single '}}' encountered in '{fragment}'"
            )));
        }

        if let Some(tail) = after.strip_prefix('{') {
            pieces.push(Piece::Brace('{'));
            rest = tail;
            continue;
        }

        let Some(end) = after.find('}') else {
            return Err(Error::PathBuild(format!("unmatched '{{' in '{fragment}'")));
        };
        let field = &after[..end];
        if field.contains('{') {
            return Err(Error::PathBuild(format!(
                "nested placeholder in '{fragment}'"
            )));
        }
        if field.contains([':', '!']) {
            return Err(Error::PathBuild(format!(
                "unsupported conversion or format spec '{{{field}}}' in '{fragment}'"
            )));
        }
        if field.is_empty() || field.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::PathBuild(format!(
                "positional placeholder '{{{field}}}' in '{fragment}'"
            )));
        }
        pieces.push(Piece::Field(field));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    Ok(pieces)
}

/// Format a fragment with a single named substitution
///
/// Returns `Ok(None)` when the fragment names a placeholder other than
/// `key`, and an error when the fragment is malformed. A fragment without
/// placeholders formats successfully with any key.
pub fn format_single(fragment: &str, key: &str, value: &str) -> Result<Option<String>> {
    let mut out = String::with_capacity(fragment.len() + value.len());
    for piece in parse(fragment)? {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Brace(c) => out.push(c),
            Piece::Field(name) if name == key => out.push_str(value),
            Piece::Field(_) => return Ok(None),
        }
    }
    Ok(Some(out))
}

/// Build path segments from a base and a pipeline
///
/// Substitution keys are tried in map order for every fragment.
pub fn build(
    base: &[String],
    pipeline: &[String],
    substitutions: &IndexMap<String, String>,
) -> Result<Vec<String>> {
    let mut segments = base.to_vec();

    for fragment in pipeline {
        let mut resolved = None;
        for (key, value) in substitutions {
            if let Some(formatted) = format_single(fragment, key, value)? {
                resolved = Some(formatted);
                break;
            }
        }

        match resolved {
            Some(segment) => segments.push(segment),
            None => {
                tracing::debug!("Pipeline fragment '{}' left unresolved", fragment);
                segments.push(fragment.clone());
            }
        }
    }

    Ok(segments)
}

/// Join segments into a path
///
/// An absolute segment replaces everything before it, like `Path::join`.
pub fn join(segments: &[String]) -> PathBuf {
    segments.iter().collect()
}
