//! The warehouse statement set: idempotent DDL, parameterized bulk loads
//! and the INSERT..SELECT transforms, grouped by pipeline phase.

pub mod copy;
pub mod ddl;
pub mod transform;

use anyhow::{bail, Result};

use crate::config::DwConfig;
use crate::filter::Phase;
use crate::schema::ALL_TABLES;

/// Target SQL dialect. Redshift is the warehouse the statement set is
/// written for; Sqlite backs the embedded execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Redshift,
    Sqlite,
}

/// DROP statements for all seven tables, in registry order
pub fn drop_statements() -> Vec<String> {
    ALL_TABLES.iter().map(|t| ddl::drop_table(t)).collect()
}

/// CREATE statements for all seven tables; the embedded dialect also
/// gets the sort-key indexes
pub fn create_statements(dialect: Dialect) -> Vec<String> {
    let mut statements = Vec::new();
    for table in ALL_TABLES {
        statements.push(ddl::create_table(table, dialect));
        if dialect == Dialect::Sqlite {
            statements.extend(ddl::create_indexes(table));
        }
    }
    statements
}

/// Rendered COPY statements for the two staging loads
pub fn copy_statements(config: &DwConfig) -> Result<Vec<String>> {
    Ok(copy::copy_specs(config)?
        .iter()
        .map(|spec| spec.render())
        .collect())
}

/// The five transforms, statement text only
pub fn insert_statements(dialect: Dialect) -> Vec<String> {
    transform::insert_statements(dialect)
        .into_iter()
        .map(|(_, sql)| sql)
        .collect()
}

/// Render the warehouse SQL script for the selected phases. The copy
/// phase needs a load configuration; the others are static.
pub fn render_script(config: Option<&DwConfig>, phases: &[Phase]) -> Result<String> {
    let mut script = String::new();

    for phase in phases {
        let statements = match phase {
            Phase::Drop => drop_statements(),
            Phase::Create => create_statements(Dialect::Redshift),
            Phase::Copy => match config {
                Some(config) => copy_statements(config)?,
                None => bail!("Rendering copy statements requires a load configuration"),
            },
            Phase::Insert => insert_statements(Dialect::Redshift),
        };

        script.push_str(&format!("-- {} --\n\n", phase.name()));
        for statement in statements {
            script.push_str(&statement);
            script.push_str(";\n\n");
        }
    }

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ALL_PHASES;

    fn test_config() -> DwConfig {
        DwConfig {
            log_data: "s3://dend-lake/log_data".to_string(),
            log_jsonpath: "s3://dend-lake/log_json_path.json".to_string(),
            song_data: "s3://dend-lake/song_data".to_string(),
            iam_role: "arn:aws:iam::123456789012:role/dwhRole".to_string(),
            region: "us-west-2".to_string(),
        }
    }

    #[test]
    fn test_statement_counts() {
        assert_eq!(drop_statements().len(), 7);
        assert_eq!(create_statements(Dialect::Redshift).len(), 7);
        assert_eq!(copy_statements(&test_config()).unwrap().len(), 2);
        assert_eq!(insert_statements(Dialect::Redshift).len(), 5);
    }

    #[test]
    fn test_full_script_renders_in_pipeline_order() {
        let script = render_script(Some(&test_config()), &ALL_PHASES).unwrap();
        let drop_pos = script.find("DROP TABLE IF EXISTS staging_events").unwrap();
        let create_pos = script.find("CREATE TABLE IF NOT EXISTS staging_events").unwrap();
        let copy_pos = script.find("copy staging_events").unwrap();
        let insert_pos = script.find("INSERT INTO songplay").unwrap();
        assert!(drop_pos < create_pos);
        assert!(create_pos < copy_pos);
        assert!(copy_pos < insert_pos);
    }

    #[test]
    fn test_render_without_config_skips_only_static_phases() {
        let phases = [Phase::Drop, Phase::Create];
        assert!(render_script(None, &phases).is_ok());
        assert!(render_script(None, &[Phase::Copy]).is_err());
    }
}
