//! INSERT..SELECT transforms populating the fact and dimension tables
//! from the staging tables.
//!
//! Every transform filters the event log to `page = 'NextSong'`. Song and
//! artist attributes come from joining events to the song catalog on
//! artist name equality; an exact textual match is required, so a
//! mismatched name drops the event from songplay, songs and artists while
//! leaving it visible to the time dimension.

use super::Dialect;

/// Epoch-millisecond column rendered as a UTC timestamp
fn epoch_to_timestamp(dialect: Dialect, ts: &str) -> String {
    match dialect {
        Dialect::Redshift => format!("timestamp 'epoch' + {}/1000 * interval '1 second'", ts),
        Dialect::Sqlite => format!("datetime({} / 1000, 'unixepoch')", ts),
    }
}

/// Calendar parts extracted from the play timestamp, in transform order.
/// The strftime specifiers reproduce the warehouse extraction semantics:
/// `%V` is the ISO-8601 week like EXTRACT(week), `%w` counts Sunday as 0
/// like EXTRACT(weekday).
const DATE_PARTS: &[(&str, &str)] = &[
    ("hour", "%H"),
    ("day", "%d"),
    ("week", "%V"),
    ("month", "%m"),
    ("year", "%Y"),
    ("weekday", "%w"),
];

pub fn songplay_insert(dialect: Dialect) -> String {
    format!(
        "INSERT INTO songplay(\n    \
             start_time,\n    \
             user_id,\n    \
             level,\n    \
             song_id,\n    \
             artist_id,\n    \
             session_id,\n    \
             location,\n    \
             user_agent)\n\
         SELECT {} AS start_time,\n       \
             se.userId,\n       \
             se.level,\n       \
             ss.song_id,\n       \
             ss.artist_id,\n       \
             se.sessionid AS session_id,\n       \
             se.location,\n       \
             se.userAgent AS user_agent\n\
         FROM staging_events se\n\
         JOIN staging_songs ss ON (se.artist = ss.artist_name)\n\
         WHERE se.page = 'NextSong'",
        epoch_to_timestamp(dialect, "se.ts")
    )
}

/// Deduplicates via DISTINCT over all five columns only; one user id with
/// two level values produces two rows.
pub fn user_insert() -> &'static str {
    "INSERT INTO users(\n    \
         user_id,\n    \
         first_name,\n    \
         last_name,\n    \
         gender,\n    \
         level)\n\
     SELECT DISTINCT userId AS user_id, firstName AS first_name, lastName AS last_name, gender, level\n\
     FROM staging_events\n\
     WHERE page = 'NextSong'"
}

pub fn song_insert() -> &'static str {
    "INSERT INTO songs(\n    \
         song_id,\n    \
         title,\n    \
         artist_id,\n    \
         year,\n    \
         duration)\n\
     SELECT DISTINCT ss.song_id, ss.title, ss.artist_id, ss.year, ss.duration\n\
     FROM staging_songs ss\n\
     JOIN staging_events se ON (se.artist = ss.artist_name)\n\
     WHERE se.page = 'NextSong'"
}

pub fn artist_insert() -> &'static str {
    "INSERT INTO artists(\n    \
         artist_id,\n    \
         artist_name,\n    \
         artist_latitude,\n    \
         artist_longitude,\n    \
         artist_location)\n\
     SELECT DISTINCT ss.artist_id, ss.artist_name, ss.artist_latitude, ss.artist_longitude, ss.artist_location\n\
     FROM staging_songs ss\n\
     JOIN staging_events se ON (se.artist = ss.artist_name)\n\
     WHERE se.page = 'NextSong'"
}

pub fn time_insert(dialect: Dialect) -> String {
    let start_time = epoch_to_timestamp(dialect, "ts");
    let parts: Vec<String> = DATE_PARTS
        .iter()
        .map(|(part, specifier)| match dialect {
            Dialect::Redshift => format!("       EXTRACT({} FROM start_time) AS {}", part, part),
            Dialect::Sqlite => format!(
                "       CAST(strftime('{}', {}) AS INTEGER) AS {}",
                specifier, start_time, part
            ),
        })
        .collect();

    format!(
        "INSERT INTO time(\n    \
             start_time,\n    \
             hour,\n    \
             day,\n    \
             week,\n    \
             month,\n    \
             year,\n    \
             weekday)\n\
         SELECT DISTINCT {} AS start_time,\n{}\n\
         FROM staging_events\n\
         WHERE page = 'NextSong'",
        start_time,
        parts.join(",\n")
    )
}

/// The five transforms in execution order, labelled by target table
pub fn insert_statements(dialect: Dialect) -> Vec<(&'static str, String)> {
    vec![
        ("songplay", songplay_insert(dialect)),
        ("users", user_insert().to_string()),
        ("songs", song_insert().to_string()),
        ("artists", artist_insert().to_string()),
        ("time", time_insert(dialect)),
    ]
}
