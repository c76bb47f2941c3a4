//! demos/queretaro_trends.rs
//!
//! Runs the whole-day-count analysis over a directory of station CSV exports
//! (one `<station id>.csv` per station) for the Querétaro municipalities.
//!
//! To run this demo:
//! cargo run --example queretaro_trends -- <data dir> [settings.toml]

use precip_trend::{
    CsvDirectoryStore, MunicipalityOutcome, PipelineConfig, PrecipTrendError, Settings,
    StationRegistry, TrendPipeline,
};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), PrecipTrendError> {
    configure_polars_display();
    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/stations".to_string()));

    let settings = match args.next() {
        Some(path) => Settings::from_path(path).await?,
        None => Settings {
            pipeline: PipelineConfig::whole_day_count(),
            registry: StationRegistry::queretaro(),
        },
    };

    let store = CsvDirectoryStore::builder().data_dir(data_dir).build();
    let pipeline = TrendPipeline::builder()
        .store(store)
        .registry(settings.registry)
        .config(settings.pipeline)
        .build()?;

    let report = pipeline.run().await?;
    for outcome in report.iter() {
        match outcome {
            MunicipalityOutcome::Done(done) => {
                println!("{}: {}", done.municipality, done.trend);
                println!("{}", done.to_dataframe()?);
            }
            MunicipalityOutcome::Skipped { municipality, stage, reason, .. } => {
                println!("{}: skipped while {} ({})", municipality, stage, reason);
            }
        }
        for source in outcome.sources() {
            if let Some(issue) = source.issue() {
                println!("  station {}: {}", source.station, issue);
            }
        }
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
