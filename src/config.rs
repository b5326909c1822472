use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_region() -> String {
    "us-west-2".to_string()
}

/// Load configuration, read once from a JSON file and passed explicitly
/// into statement construction. Every field is checked before any SQL is
/// rendered; a bad value is a config error here, never malformed SQL.
#[derive(Debug, Clone, Deserialize)]
pub struct DwConfig {
    /// Location of the event-log data (object-storage prefix for rendered
    /// COPY statements; local path or http(s) URL for the embedded run)
    pub log_data: String,
    /// Location of the JSONPaths descriptor mapping event-log fields
    pub log_jsonpath: String,
    /// Location of the song-catalog data
    pub song_data: String,
    /// Access-role identifier substituted into COPY statements
    pub iam_role: String,
    /// Warehouse region for COPY
    #[serde(default = "default_region")]
    pub region: String,
}

impl DwConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: DwConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty values, reporting every offending field at once
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("log_data", &self.log_data),
            ("log_jsonpath", &self.log_jsonpath),
            ("song_data", &self.song_data),
            ("iam_role", &self.iam_role),
            ("region", &self.region),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            bail!("Missing required config values: {}", missing.join(", "));
        }
        Ok(())
    }
}
