pub mod date_parsing;
pub mod error;
pub mod record_cleaner;
