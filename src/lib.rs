mod aggregation;
mod cleaning;
mod config;
mod error;
mod pipeline;
mod storage;
mod trend;
mod types;

pub use error::PrecipTrendError;

pub use cleaning::date_parsing::parse_day_first;
pub use cleaning::error::MalformedRecord;
pub use cleaning::record_cleaner::*;

pub use aggregation::annual_aggregator::*;
pub use aggregation::source_combiner::*;

pub use trend::error::FitError;
pub use trend::horizon::ProjectionHorizon;
pub use trend::trend_model::*;

pub use types::annual_summary::AnnualSummary;
pub use types::measurement::*;
pub use types::raw_measurement::{RawMeasurement, RawValue};
pub use types::series::{CombinedYear, MunicipalitySeries};
pub use types::year_range::{YearRange, YearWindow};

pub use storage::csv_directory::*;
pub use storage::error::StoreError;
pub use storage::in_memory::InMemoryStore;
pub use storage::StationStore;

pub use config::error::ConfigError;
pub use config::pipeline_config::*;
pub use config::station_registry::{Municipality, StationRegistry};
pub use config::Settings;

pub use pipeline::orchestrator::TrendPipeline;
pub use pipeline::report::*;
pub use pipeline::stage::PipelineStage;
