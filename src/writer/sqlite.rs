use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::DwConfig;
use crate::filter::Phase;
use crate::parser::{parse_record, FieldMapping, JsonPaths, ParsedRow};
use crate::schema::{TableSchema, ALL_TABLES};
use crate::source::{self, CacheManager};
use crate::sql::copy::{copy_specs, CopyFormat, CopySpec};
use crate::sql::{ddl, transform, Dialect};

const BATCH_SIZE: usize = 1000;

/// Row counts per table from a pipeline run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub staged: Vec<(&'static str, u64)>,
    pub transformed: Vec<(&'static str, usize)>,
}

/// Executes the statement set over a single blocking connection to the
/// embedded warehouse database.
pub struct WarehouseWriter {
    conn: Connection,
}

impl WarehouseWriter {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open warehouse database")?;

        // Optimize for bulk insert
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    /// Idempotent teardown of all seven tables
    pub fn drop_tables(&self) -> Result<()> {
        for table in ALL_TABLES {
            self.conn
                .execute(&ddl::drop_table(table), [])
                .with_context(|| format!("Failed to drop table: {}", table.name))?;
        }
        Ok(())
    }

    /// Idempotent creation of all seven tables plus sort-key indexes
    pub fn create_tables(&self) -> Result<()> {
        println!("Creating {} tables...", ALL_TABLES.len());

        for table in ALL_TABLES {
            let sql = ddl::create_table(table, Dialect::Sqlite);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", table.name))?;

            for index_sql in ddl::create_indexes(table) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", table.name))?;
            }
        }

        Ok(())
    }

    /// Bulk-load one staging table from NDJSON files, batched inside a
    /// single transaction
    pub fn load_staging(
        &mut self,
        table: &'static TableSchema,
        files: &[PathBuf],
        mapping: &FieldMapping,
        progress: &ProgressBar,
    ) -> Result<u64> {
        let columns = table.insert_columns();
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name,
            names.join(", "),
            placeholders
        );

        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;
        let mut batch: Vec<ParsedRow> = Vec::with_capacity(BATCH_SIZE);

        for file_path in files {
            let file = File::open(file_path)
                .with_context(|| format!("Failed to open: {:?}", file_path))?;
            let reader = BufReader::new(file);

            for line in reader.lines() {
                let line = line.context("Failed to read line")?;
                if line.trim().is_empty() {
                    continue;
                }

                let row = parse_record(&line, table, mapping)
                    .with_context(|| format!("Failed to parse record in {:?}", file_path))?;

                batch.push(row);

                if batch.len() >= BATCH_SIZE {
                    insert_batch(&tx, &insert_sql, &batch)?;
                    count += batch.len() as u64;
                    progress.set_position(count);
                    batch.clear();
                }
            }
        }

        if !batch.is_empty() {
            insert_batch(&tx, &insert_sql, &batch)?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        progress.set_position(count);
        progress.finish_with_message(format!("{}: {} records", table.name, count));

        Ok(count)
    }

    /// Run the five transforms in order, returning rows written per table
    pub fn insert_transforms(&self) -> Result<Vec<(&'static str, usize)>> {
        let mut results = Vec::new();

        for (name, sql) in transform::insert_statements(Dialect::Sqlite) {
            let rows = self
                .conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to populate table: {}", name))?;
            println!("Populated {}: {} rows", name, rows);
            results.push((name, rows));
        }

        Ok(results)
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

fn insert_batch(tx: &rusqlite::Transaction, sql: &str, batch: &[ParsedRow]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, value) in row.values.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}

/// Field mapping for one staging load: positional from the configured
/// JSONPaths descriptor, or name matching for `auto`
fn mapping_for(spec: &CopySpec, cache: &CacheManager, refresh: bool) -> Result<FieldMapping> {
    match &spec.format {
        CopyFormat::Auto => Ok(FieldMapping::Auto),
        CopyFormat::JsonPaths(location) => {
            let text = source::fetch_text(location, cache, refresh)?;
            let paths = JsonPaths::for_table(&text, spec.table)?;
            Ok(FieldMapping::Paths(paths.fields))
        }
    }
}

fn count_lines(files: &[PathBuf]) -> Result<u64> {
    let mut total = 0u64;
    for path in files {
        let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
        total += BufReader::new(file).lines().count() as u64;
    }
    Ok(total)
}

fn load_all_staging(
    writer: &mut WarehouseWriter,
    config: &DwConfig,
    cache_dir: Option<PathBuf>,
    refresh: bool,
) -> Result<Vec<(&'static str, u64)>> {
    let cache = CacheManager::new(cache_dir)?;
    let specs = copy_specs(config)?;

    let multi = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap()
        .progress_chars("=>-");

    let mut staged = Vec::new();

    for spec in specs {
        let files = source::resolve_data_files(&spec.location, &cache, refresh)?;
        let mapping = mapping_for(&spec, &cache, refresh)?;

        let pb = multi.add(ProgressBar::new(count_lines(&files)?));
        pb.set_style(style.clone());
        pb.set_message(spec.table.name.to_string());

        let count = writer.load_staging(spec.table, &files, &mapping, &pb)?;
        staged.push((spec.table.name, count));
    }

    Ok(staged)
}

/// Execute the selected pipeline phases in order against the embedded
/// warehouse: drop all, create all, load all staging, run all transforms.
/// Each statement runs to completion before the next; the first failure
/// aborts the run.
pub fn run_pipeline(
    config: &DwConfig,
    output_db: &Path,
    phases: &[Phase],
    cache_dir: Option<PathBuf>,
    refresh: bool,
) -> Result<PipelineSummary> {
    let mut writer = WarehouseWriter::open(output_db)?;
    let mut summary = PipelineSummary::default();

    for phase in phases {
        match phase {
            Phase::Drop => writer.drop_tables()?,
            Phase::Create => writer.create_tables()?,
            Phase::Copy => {
                summary.staged = load_all_staging(&mut writer, config, cache_dir.clone(), refresh)?
            }
            Phase::Insert => summary.transformed = writer.insert_transforms()?,
        }
    }

    writer.finalize()?;
    Ok(summary)
}
