//! Secretfile manifest parser.
//!
//! The manifest is line-oriented plain text: one `LOGICAL_KEY address` pair
//! per line, `#` comment lines, and `$NAME` environment interpolation inside
//! addresses. Parsing preserves manifest order for enumeration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::constants;
use crate::error::{Error, Result};

/// Resolve the manifest path from an explicit argument, the
/// `SECRETFILE_PATH` environment variable, or the default filename in the
/// working directory, in that order.
pub fn manifest_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Ok(path) = env::var(constants::MANIFEST_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(constants::DEFAULT_MANIFEST_NAME)
}

/// Read and parse a manifest file, interpolating against the process
/// environment.
pub fn load(path: &Path) -> Result<IndexMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_content(&content, |name| env::var(name).ok())
}

/// Parse manifest content (testable without the filesystem or process
/// environment).
///
/// Rules, per line:
/// - first character `#` → comment, skipped with no interpolation;
/// - blank (or all-whitespace) → skipped, same ergonomics as comments;
/// - otherwise exactly two whitespace-separated tokens, key then address.
///
/// A later duplicate key overwrites the earlier value but keeps the first
/// occurrence's position in the ordering.
pub fn parse_content<F>(content: &str, lookup: F) -> Result<IndexMap<String, String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut entries = IndexMap::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_num = idx + 1;
        if raw_line.starts_with('#') {
            continue;
        }
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(Error::MalformedLine {
                line: line_num,
                found: tokens.len(),
            });
        }

        let key = tokens[0].to_string();
        let address = interpolate(&key, tokens[1], &lookup)?;
        entries.insert(key, address);
    }

    Ok(entries)
}

/// Replace every `$NAME` reference (`[A-Za-z0-9_]+`, longest run, no braces)
/// in `template` with the looked-up value. An unresolvable reference fails,
/// naming both the variable and the logical key whose address needed it.
fn interpolate<F>(key: &str, template: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        let name_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        if name_len == 0 {
            // a bare `$` is literal text
            out.push('$');
            continue;
        }

        let name = &rest[..name_len];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => {
                return Err(Error::UnresolvedVariable {
                    var: name.to_string(),
                    key: key.to_string(),
                })
            }
        }
        rest = &rest[name_len..];
    }

    out.push_str(rest);
    Ok(out)
}
