use anyhow::Result;
use playmart::{
    cli::{Cli, Commands},
    config::DwConfig,
    filter::{resolve_phases, Phase},
    schema::table_names,
    sql,
    writer::run_pipeline,
};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            output_db,
            config,
            only,
            skip,
            cache_dir,
            refresh,
        } => {
            let start = Instant::now();

            let phases = resolve_phases(only, skip)?;
            let config = DwConfig::load(&config)?;

            let summary = run_pipeline(&config, &output_db, &phases, cache_dir, refresh)?;

            let elapsed = start.elapsed();
            println!(
                "\nWarehouse {:?} ready in {:.1}s",
                output_db,
                elapsed.as_secs_f64()
            );
            for (table, records) in &summary.staged {
                println!("  staged {}: {} records", table, records);
            }
            for (table, rows) in &summary.transformed {
                println!("  {}: {} rows", table, rows);
            }
        }

        Commands::Render { config, only, skip } => {
            let phases = resolve_phases(only, skip)?;

            // The static phases render without a configuration
            let config = if phases.contains(&Phase::Copy) {
                Some(DwConfig::load(&config)?)
            } else {
                None
            };

            print!("{}", sql::render_script(config.as_ref(), &phases)?);
        }

        Commands::ListTables => {
            println!("Warehouse tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
