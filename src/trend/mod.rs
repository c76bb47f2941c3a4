pub mod error;
pub mod horizon;
pub mod trend_model;
