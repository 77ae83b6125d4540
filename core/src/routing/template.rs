//! # Route Template Utilities
//!
//! Placeholder discovery, optional-segment expansion and path normalization.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"))
}

/// Name of a placeholder body: `*path` → `path`, `id:int?` → `id`, `page=1` → `page`.
pub fn placeholder_name(body: &str) -> &str {
    let body = body.trim_start_matches('*');
    let end = body
        .find(|c: char| c == ':' || c == '?' || c == '=')
        .unwrap_or(body.len());
    body[..end].trim()
}

/// Placeholder names in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| placeholder_name(m.as_str()).to_string())
        .collect()
}

/// Whether the template has a placeholder for `name` (case-insensitive).
pub fn has_placeholder(template: &str, name: &str) -> bool {
    placeholders(template)
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}

/// Expands optional placeholders (`{id?}`).
///
/// When the action has a parameter of that name, two variants are produced:
/// one with the placeholder required and one without the segment. When it has
/// none, the segment is dropped.
pub fn expand_optional(template: &str, has_parameter: &dyn Fn(&str) -> bool) -> Vec<String> {
    let segments: Vec<&str> = template.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        let Some(body) = optional_body(segment) else {
            continue;
        };
        let name = placeholder_name(body);
        let without: Vec<&str> = segments[..i]
            .iter()
            .chain(segments[i + 1..].iter())
            .copied()
            .collect();
        let without = without.join("/");

        if !has_parameter(name) {
            return expand_optional(&without, has_parameter);
        }

        let required = format!("{{{}}}", body.trim_end_matches('?'));
        let mut with: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        with[i] = required;
        let with = with.join("/");

        let mut variants = expand_optional(&with, has_parameter);
        variants.extend(expand_optional(&without, has_parameter));
        return variants;
    }
    vec![template.to_string()]
}

fn optional_body(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    inner.ends_with('?').then_some(inner)
}

/// Removes the placeholder of `name` together with its segment.
pub fn remove_placeholder(template: &str, name: &str) -> String {
    let kept: Vec<&str> = template
        .split('/')
        .filter(|segment| {
            let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                return true;
            };
            !placeholder_name(inner).eq_ignore_ascii_case(name)
        })
        .collect();
    kept.join("/")
}

/// Normalizes a path for the document.
///
/// Ensures a single leading slash, collapses repeated slashes, drops a
/// trailing slash and reduces every placeholder to its bare name
/// (wildcards, constraints, defaults and optional markers are not
/// expressible in the output).
pub fn normalize_path(path: &str) -> String {
    let stripped = placeholder_regex().replace_all(path, |caps: &regex::Captures<'_>| {
        format!("{{{}}}", placeholder_name(&caps[1]))
    });
    let segments: Vec<&str> = stripped
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Lower-cases literal segments; placeholders keep their case.
pub fn lowercase_literals(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') {
                segment.to_string()
            } else {
                segment.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a prefix and a template with exactly one slash.
pub fn join(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let template = template.trim_start_matches('/');
    match (prefix.is_empty(), template.is_empty()) {
        (true, _) => template.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}/{}", prefix, template),
    }
}
