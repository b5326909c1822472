//! Table definitions for the music-streaming star schema

use super::types::*;

// =============================================================================
// Staging Tables (raw landing zones)
// =============================================================================

/// One row per ingested event-log record. Column names follow the JSON
/// field names of the log format, except `sessionid`.
pub static STAGING_EVENTS: TableSchema = TableSchema {
    name: "staging_events",
    kind: TableKind::Staging,
    columns: &[
        Column::required("event_id", ColumnType::BigInt).identity(),
        Column::new("artist", ColumnType::Varchar),
        Column::new("auth", ColumnType::Varchar),
        Column::new("firstName", ColumnType::Varchar),
        Column::new("gender", ColumnType::Char),
        Column::new("itemInSession", ColumnType::Varchar),
        Column::new("lastName", ColumnType::Varchar),
        Column::new("length", ColumnType::Float),
        Column::new("level", ColumnType::Varchar),
        Column::new("location", ColumnType::Varchar),
        Column::new("method", ColumnType::Varchar),
        Column::new("page", ColumnType::Varchar),
        Column::new("registration", ColumnType::Float),
        Column::required("sessionid", ColumnType::Int)
            .sort_key()
            .dist_key()
            .json("sessionId"),
        Column::new("song", ColumnType::Varchar),
        Column::new("status", ColumnType::Int),
        Column::required("ts", ColumnType::BigInt),
        Column::new("userAgent", ColumnType::Varchar),
        Column::new("userId", ColumnType::Int),
    ],
};

/// One row per song-catalog record
pub static STAGING_SONGS: TableSchema = TableSchema {
    name: "staging_songs",
    kind: TableKind::Staging,
    columns: &[
        Column::new("num_songs", ColumnType::Int),
        Column::required("artist_id", ColumnType::Varchar)
            .sort_key()
            .dist_key(),
        Column::new("artist_latitude", ColumnType::Float),
        Column::new("artist_longitude", ColumnType::Float),
        Column::new("artist_location", ColumnType::Varchar),
        Column::new("artist_name", ColumnType::Varchar),
        Column::required("song_id", ColumnType::Varchar),
        Column::new("title", ColumnType::Varchar),
        Column::new("duration", ColumnType::Float),
        Column::new("year", ColumnType::Int),
    ],
};

// =============================================================================
// Fact Table
// =============================================================================

/// One row per NextSong play event
pub static SONGPLAY: TableSchema = TableSchema {
    name: "songplay",
    kind: TableKind::Fact,
    columns: &[
        Column::required("songplay_id", ColumnType::BigInt)
            .identity()
            .primary_key()
            .sort_key(),
        Column::required("start_time", ColumnType::Timestamp),
        Column::required("user_id", ColumnType::Int).dist_key(),
        Column::new("level", ColumnType::Varchar),
        Column::required("song_id", ColumnType::Varchar),
        Column::required("artist_id", ColumnType::Varchar),
        Column::required("session_id", ColumnType::Varchar),
        Column::new("location", ColumnType::Varchar),
        Column::new("user_agent", ColumnType::Varchar),
    ],
};

// =============================================================================
// Dimension Tables
// =============================================================================

pub static USERS: TableSchema = TableSchema {
    name: "users",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("user_id", ColumnType::Int).primary_key().sort_key(),
        Column::new("first_name", ColumnType::Varchar),
        Column::new("last_name", ColumnType::Varchar),
        Column::new("gender", ColumnType::Varchar),
        Column::new("level", ColumnType::Varchar),
    ],
};

pub static SONGS: TableSchema = TableSchema {
    name: "songs",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("song_id", ColumnType::Varchar).primary_key().sort_key(),
        Column::new("title", ColumnType::Varchar),
        Column::required("artist_id", ColumnType::Varchar),
        Column::new("year", ColumnType::Int),
        Column::new("duration", ColumnType::Decimal(9)),
    ],
};

pub static ARTISTS: TableSchema = TableSchema {
    name: "artists",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("artist_id", ColumnType::Varchar).primary_key().sort_key(),
        Column::new("artist_name", ColumnType::Varchar),
        Column::new("artist_location", ColumnType::Varchar),
        Column::new("artist_latitude", ColumnType::Float),
        Column::new("artist_longitude", ColumnType::Float),
    ],
};

/// Calendar decomposition of every play timestamp, UTC
pub static TIME: TableSchema = TableSchema {
    name: "time",
    kind: TableKind::Dimension,
    columns: &[
        Column::new("start_time", ColumnType::Timestamp).primary_key().sort_key(),
        Column::new("hour", ColumnType::SmallInt),
        Column::new("day", ColumnType::SmallInt),
        Column::new("week", ColumnType::SmallInt),
        Column::new("month", ColumnType::SmallInt),
        Column::new("year", ColumnType::SmallInt),
        Column::new("weekday", ColumnType::SmallInt),
    ],
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All tables in drop/create order: staging first, then fact, then dimensions
pub static ALL_TABLES: &[&TableSchema] = &[
    &STAGING_EVENTS,
    &STAGING_SONGS,
    &SONGPLAY,
    &USERS,
    &SONGS,
    &ARTISTS,
    &TIME,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

/// The raw landing-zone tables, in load order
pub fn staging_tables() -> Vec<&'static TableSchema> {
    ALL_TABLES
        .iter()
        .filter(|t| t.kind == TableKind::Staging)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_all_seven_tables() {
        assert_eq!(
            table_names(),
            vec![
                "staging_events",
                "staging_songs",
                "songplay",
                "users",
                "songs",
                "artists",
                "time"
            ]
        );
    }

    #[test]
    fn test_get_table() {
        assert_eq!(get_table("songplay").unwrap().kind, TableKind::Fact);
        assert!(get_table("nonexistent").is_none());
    }

    #[test]
    fn test_staging_tables_in_load_order() {
        let names: Vec<_> = staging_tables().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["staging_events", "staging_songs"]);
    }

    #[test]
    fn test_event_session_column_maps_to_camel_case_field() {
        let col = STAGING_EVENTS
            .columns
            .iter()
            .find(|c| c.name == "sessionid")
            .unwrap();
        assert_eq!(col.json_key(), "sessionId");
    }
}
