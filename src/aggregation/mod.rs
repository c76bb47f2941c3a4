pub mod annual_aggregator;
pub mod source_combiner;
