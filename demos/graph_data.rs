//! demos/graph_data.rs
//!
//! Computes the short-window trend for one municipality from station CSV exports
//! and plots the observed annual means against the fitted and projected line.
//!
//! To run this demo:
//! cargo run --example graph_data --features demos -- <data dir>

use std::env;
use std::error::Error;
use std::path::PathBuf;

use plotlars::{Legend, Line, Plot, Rgb, Shape, Text, TimeSeriesPlot};
use polars::prelude::*;
use precip_trend::{CsvDirectoryStore, PipelineConfig, StationRegistry, TrendPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let data_dir = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "data/stations".to_string()));

    let pipeline = TrendPipeline::builder()
        .store(CsvDirectoryStore::builder().data_dir(data_dir).build())
        .registry(StationRegistry::queretaro())
        .config(PipelineConfig::short_window())
        .build()?;
    let report = pipeline.run().await?;

    let Some(done) = report.done().next() else {
        println!("No municipality had enough data to plot.");
        return Ok(());
    };

    println!("Plotting {} ({})...", done.municipality, done.trend);
    plot_trend(&done.to_dataframe()?, &done.municipality);
    println!("Plot shown in browser.");

    Ok(())
}

/// Plots the 'mean' and 'predicted' columns against 'year'.
fn plot_trend(data: &DataFrame, municipality: &str) {
    let title = format!("Annual precipitation: {}", municipality);
    TimeSeriesPlot::builder()
        .data(data)
        .x("year")
        .y("mean")
        .additional_series(vec!["predicted"])
        .size(8)
        .colors(vec![Rgb(69, 157, 230), Rgb(235, 117, 0)])
        .lines(vec![Line::Solid, Line::Dash])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Square])
        .plot_title(Text::from(title.as_str()).size(18))
        .legend(&Legend::new().x(0.05).y(0.9))
        .x_title("year")
        .y_title("mm")
        .build()
        .plot();
}
