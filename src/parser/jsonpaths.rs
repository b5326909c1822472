use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::schema::TableSchema;

#[derive(Debug, Deserialize)]
struct JsonPathsFile {
    jsonpaths: Vec<String>,
}

/// Positional field mapping parsed from a JSONPaths descriptor:
/// `{"jsonpaths": ["$['artist']", "$['auth']", ...]}`, one entry per
/// staging column in declaration order.
#[derive(Debug, Clone)]
pub struct JsonPaths {
    pub fields: Vec<String>,
}

impl JsonPaths {
    pub fn parse(text: &str) -> Result<Self> {
        let file: JsonPathsFile =
            serde_json::from_str(text).context("Failed to parse JSONPaths descriptor")?;
        let fields = file
            .jsonpaths
            .iter()
            .map(|path| parse_path(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    /// Parse and check the entry count against the table's insert columns
    pub fn for_table(text: &str, table: &TableSchema) -> Result<Self> {
        let paths = Self::parse(text)?;
        let expected = table.insert_columns().len();
        if paths.fields.len() != expected {
            bail!(
                "JSONPaths descriptor has {} entries but {} has {} columns to load",
                paths.fields.len(),
                table.name,
                expected
            );
        }
        Ok(paths)
    }
}

/// Accepts the bracket form `$['field']` (double quotes too) and the dot
/// form `$.field`; only single-level paths map onto staging columns.
fn parse_path(path: &str) -> Result<String> {
    let field = if let Some(inner) = strip_wrapped(path, "$['", "']") {
        Some(inner)
    } else if let Some(inner) = strip_wrapped(path, "$[\"", "\"]") {
        Some(inner)
    } else {
        path.strip_prefix("$.")
    };

    match field {
        Some(f) if !f.is_empty() && !f.contains(['.', '[', '\'', '"']) => Ok(f.to_string()),
        _ => bail!("Unsupported JSONPath expression: {}", path),
    }
}

fn strip_wrapped<'a>(path: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)?.strip_suffix(suffix)
}
