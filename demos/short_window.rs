//! demos/short_window.rs
//!
//! Runs the 2018–2023 short-window analysis on records held in memory, the way a
//! host that already loaded its documents would.
//!
//! To run this demo:
//! cargo run --example short_window

use precip_trend::{
    InMemoryStore, PipelineConfig, PrecipTrendError, RawMeasurement, StationRegistry,
    TrendPipeline,
};

/// A synthetic station: daily readings that get a little wetter every year.
fn synthetic_station(base: f64) -> Vec<RawMeasurement> {
    (2016..=2023)
        .flat_map(|year| {
            (1..=28).flat_map(move |day| {
                (1..=12).map(move |month| {
                    let value = base + (year - 2016) as f64 * 0.2 + (day % 5) as f64;
                    RawMeasurement::new(format!("{:02}/{:02}/{}", day, month, year), format!("{:.1}", value))
                })
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), PrecipTrendError> {
    let store = InMemoryStore::new()
        .with_station("22005_CADEREYTA_DE_MONTES", synthetic_station(1.0))
        .with_station("22021_CADEREYTA_DE_MONTES", synthetic_station(1.5))
        .with_station("22036_ARROYO_SECO", vec![RawMeasurement::new("01/06/2021", "NULO")]);

    let registry = StationRegistry::new()
        .with_municipality(
            "Cadereyta",
            ["22005_CADEREYTA_DE_MONTES", "22021_CADEREYTA_DE_MONTES"],
        )?
        .with_municipality("Arroyo Seco", ["22036_ARROYO_SECO"])?;

    let report = TrendPipeline::builder()
        .store(store)
        .registry(registry)
        .config(PipelineConfig::short_window())
        .build()?
        .run()
        .await?;

    for done in report.done() {
        println!("{}: {}", done.municipality, done.trend);
        for projected in &done.projection.years {
            println!("  {}: {:.2} mm", projected.year, projected.predicted);
        }
    }
    println!("{} municipalities skipped", report.skipped_count());

    Ok(())
}
