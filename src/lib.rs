pub mod api;
pub mod data_collector;
pub mod fundamentals;
pub mod ingestor;
pub mod landmarks;
pub mod models;
pub mod prompt;
pub mod report;
pub mod utils;
