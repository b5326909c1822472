use crate::config::DwConfig;
use crate::schema::{tables, TableSchema};

/// How the bulk load maps JSON fields onto staging columns
#[derive(Debug, Clone, PartialEq)]
pub enum CopyFormat {
    /// Match JSON fields to column names
    Auto,
    /// Positional mapping read from a JSONPaths descriptor at this location
    JsonPaths(String),
}

impl CopyFormat {
    /// The `json` clause value of the rendered statement
    pub fn descriptor(&self) -> String {
        match self {
            CopyFormat::Auto => "'auto'".to_string(),
            CopyFormat::JsonPaths(location) => format!("'{}'", location),
        }
    }
}

/// One fully-parameterized bulk load. Renders as a warehouse COPY
/// statement and also drives the embedded load path.
#[derive(Debug, Clone)]
pub struct CopySpec {
    pub table: &'static TableSchema,
    pub location: String,
    pub iam_role: String,
    pub format: CopyFormat,
    pub region: String,
}

impl CopySpec {
    pub fn render(&self) -> String {
        format!(
            "copy {}\nfrom '{}'\niam_role '{}'\njson {}\nregion '{}'",
            self.table.name,
            self.location,
            self.iam_role,
            self.format.descriptor(),
            self.region
        )
    }
}

/// Build the two staging loads from a validated configuration:
/// the event log with its JSONPaths mapping, then the song catalog
/// with automatic field matching.
pub fn copy_specs(config: &DwConfig) -> anyhow::Result<Vec<CopySpec>> {
    config.validate()?;

    Ok(vec![
        CopySpec {
            table: &tables::STAGING_EVENTS,
            location: config.log_data.clone(),
            iam_role: config.iam_role.clone(),
            format: CopyFormat::JsonPaths(config.log_jsonpath.clone()),
            region: config.region.clone(),
        },
        CopySpec {
            table: &tables::STAGING_SONGS,
            location: config.song_data.clone(),
            iam_role: config.iam_role.clone(),
            format: CopyFormat::Auto,
            region: config.region.clone(),
        },
    ])
}
