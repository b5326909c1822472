/// Column data type, named after the warehouse type it renders to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    SmallInt,
    Int,
    BigInt,
    Float,
    /// Fixed-precision numeric with scale 0
    Decimal(u8),
    Char,
    Varchar,
    Timestamp,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Auto-incrementing surrogate key, filled by the engine
    pub identity: bool,
    pub primary_key: bool,
    pub sort_key: bool,
    pub dist_key: bool,
    /// Override JSON field name for auto mapping (default: column name)
    pub json_field: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            identity: false,
            primary_key: false,
            sort_key: false,
            dist_key: false,
            json_field: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, col_type)
        }
    }

    /// Mark as an identity column (implies required)
    pub const fn identity(self) -> Self {
        Self {
            identity: true,
            nullable: false,
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn sort_key(self) -> Self {
        Self {
            sort_key: true,
            ..self
        }
    }

    pub const fn dist_key(self) -> Self {
        Self {
            dist_key: true,
            ..self
        }
    }

    /// Set the JSON field name (for when it differs from the column name)
    pub const fn json(self, field: &'static str) -> Self {
        Self {
            json_field: Some(field),
            ..self
        }
    }

    /// JSON field this column maps to in auto mode
    pub fn json_key(&self) -> &'static str {
        self.json_field.unwrap_or(self.name)
    }
}

/// Role a table plays in the star schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableKind {
    Staging,
    Fact,
    Dimension,
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Columns populated by the loader or a transform, i.e. everything
    /// except engine-filled identity columns
    pub fn insert_columns(&self) -> Vec<&'static Column> {
        self.columns.iter().filter(|c| !c.identity).collect()
    }

    /// Columns carrying a sort-key hint
    pub fn sort_key_columns(&self) -> Vec<&'static Column> {
        self.columns.iter().filter(|c| c.sort_key).collect()
    }
}
