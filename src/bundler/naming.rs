//! Maven coordinate to bundle symbolic name conversion.

use crate::models::{Coordinate, OsgiVersion};

/// Derives a bundle symbolic name from a coordinate.
///
/// - `org.apache.commons:commons` becomes `org.apache.commons`
/// - `org.apache.commons:commons-io` becomes `org.apache.commons.io`
/// - `org.slf4j:org.slf4j.api` stays `org.slf4j.api`
/// - anything else becomes `group.artifact`
///
/// A classifier, if any, is appended as a last segment so that `tests` jars do not
/// clash with their main artifact.
pub fn symbolic_name(coordinate: &Coordinate) -> String {
    let group = coordinate.group_id();
    let artifact = coordinate.artifact_id();
    let last_segment = group.rsplit('.').next().unwrap_or(group);

    let name = if artifact == last_segment {
        group.to_string()
    } else if let Some(rest) = artifact
        .strip_prefix(last_segment)
        .and_then(|rest| rest.strip_prefix(['-', '.']))
        .filter(|rest| !rest.is_empty())
    {
        format!("{group}.{rest}")
    } else if artifact.starts_with(group) {
        artifact.to_string()
    } else {
        format!("{group}.{artifact}")
    };

    let name = match coordinate.classifier() {
        Some(classifier) => format!("{name}.{classifier}"),
        None => name,
    };

    sanitize(&name)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Dot-separated tokens of `[A-Za-z0-9_-]`, none of them empty.
pub fn is_valid_symbolic_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|token| {
            !token.is_empty()
                && token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

pub fn bundle_file_name(symbolic_name: &str, version: &OsgiVersion) -> String {
    format!("{symbolic_name}_{version}.jar")
}

pub fn source_symbolic_name(symbolic_name: &str) -> String {
    format!("{symbolic_name}.source")
}
