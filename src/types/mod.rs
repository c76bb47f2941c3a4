pub mod annual_summary;
pub mod measurement;
pub mod raw_measurement;
pub mod series;
pub mod year_range;
