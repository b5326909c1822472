use crate::schema::{Column, ColumnType, TableSchema};

use super::Dialect;

/// Generate an idempotent DROP TABLE statement
pub fn drop_table(table: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", table.name)
}

/// Generate an idempotent CREATE TABLE statement for a dialect
pub fn create_table(table: &TableSchema, dialect: Dialect) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|col| format!("    {}", column_def(col, dialect)))
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        table.name,
        columns.join(",\n")
    )
}

/// Generate CREATE INDEX statements materializing sort-key hints on the
/// embedded engine. Identity columns are already the rowid and need none.
pub fn create_indexes(table: &TableSchema) -> Vec<String> {
    table
        .sort_key_columns()
        .iter()
        .filter(|col| !col.identity)
        .map(|col| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                table.name, col.name, table.name, col.name
            )
        })
        .collect()
}

fn column_def(col: &Column, dialect: Dialect) -> String {
    match dialect {
        Dialect::Redshift => {
            let mut def = format!("{} {}", col.name, type_name(col.col_type));
            if col.identity {
                def.push_str(" IDENTITY(0,1)");
            }
            if col.primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if !col.nullable && !col.primary_key {
                def.push_str(" NOT NULL");
            }
            if col.sort_key {
                def.push_str(" SORTKEY");
            }
            if col.dist_key {
                def.push_str(" DISTKEY");
            }
            def
        }
        Dialect::Sqlite => {
            // Identity maps to the rowid; other primary-key hints stay
            // unenforced, matching the warehouse's informational constraints.
            if col.identity {
                return format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", col.name);
            }
            let mut def = format!("{} {}", col.name, type_name(col.col_type));
            if !col.nullable {
                def.push_str(" NOT NULL");
            }
            def
        }
    }
}

fn type_name(col_type: ColumnType) -> String {
    match col_type {
        ColumnType::SmallInt => "SMALLINT".to_string(),
        ColumnType::Int => "INT".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Float => "FLOAT".to_string(),
        ColumnType::Decimal(precision) => format!("DECIMAL({})", precision),
        ColumnType::Char => "CHAR".to_string(),
        ColumnType::Varchar => "VARCHAR".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
    }
}
